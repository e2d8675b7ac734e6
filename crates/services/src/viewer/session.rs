//! One viewer's open exercise: a resolution feeding exactly one gallery and
//! its lightbox. Opening another exercise replaces both; a resolution that
//! finishes after a newer one was requested is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use domains::{DomainError, ViewerHost};
use tracing::debug;
use uuid::Uuid;

use super::gallery::GalleryViewer;
use crate::navigation::Outcome;
use crate::request::{RequestToken, TokenSource};
use crate::resolver::SolutionResolver;

#[derive(Clone)]
pub struct ViewerSession {
    inner: Arc<Inner>,
}

struct Inner {
    resolver: SolutionResolver,
    host: Arc<dyn ViewerHost>,
    viewer_id: Uuid,
    tokens: TokenSource,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    pending: Option<RequestToken>,
    gallery: Option<GalleryViewer>,
}

impl ViewerSession {
    pub fn new(resolver: SolutionResolver, host: Arc<dyn ViewerHost>, viewer_id: Uuid) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                host,
                viewer_id,
                tokens: TokenSource::default(),
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn viewer_id(&self) -> Uuid {
        self.inner.viewer_id
    }

    /// A resolution is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().pending.is_some()
    }

    /// Resolves `exercise_id` and opens a fresh gallery titled `title` over it.
    /// The previous gallery, if any, is closed as soon as the request is issued.
    pub async fn open_exercise(&self, exercise_id: Uuid, title: impl Into<String>) -> Result<Outcome, DomainError> {
        let token = {
            let mut state = self.state();
            let token = self.inner.tokens.issue();
            state.pending = Some(token);
            state.gallery = None;
            token
        };
        debug!(token = %token, %exercise_id, "resolving exercise");

        let result = self.inner.resolver.resolve(exercise_id, self.inner.viewer_id).await;

        let mut state = self.state();
        if state.pending != Some(token) {
            debug!(token = %token, %exercise_id, "discarding stale resolution");
            return Ok(Outcome::Superseded);
        }
        state.pending = None;
        let resolution = result?;
        state.gallery = Some(GalleryViewer::new(
            title,
            resolution.images,
            Arc::clone(&self.inner.host),
        ));
        Ok(Outcome::Applied)
    }

    /// Runs `f` against the open gallery, if there is one.
    pub fn with_gallery<R>(&self, f: impl FnOnce(&mut GalleryViewer) -> R) -> Option<R> {
        self.state().gallery.as_mut().map(f)
    }

    /// Closes the gallery and the lightbox, and forgets any pending resolution.
    pub fn close(&self) {
        let mut state = self.state();
        state.pending = None;
        if let Some(mut gallery) = state.gallery.take() {
            gallery.close();
            debug!("gallery closed");
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
