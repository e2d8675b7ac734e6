//! # ImagePreloadCache
//!
//! Warms the image loader for a freshly resolved list so the gallery and the
//! lightbox display without waiting. Fire-and-forget: failures are logged and
//! the page simply loads on demand later.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use domains::{ImageLoader, ImageRef};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::request::bounded;

#[derive(Clone)]
pub struct ImagePreloadCache {
    loader: Arc<dyn ImageLoader>,
    fetch_timeout: Duration,
}

/// Detached preload tasks. Dropping the batch does not cancel them.
#[derive(Debug, Default)]
pub struct PreloadBatch {
    handles: Vec<JoinHandle<()>>,
}

impl PreloadBatch {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every task to finish, successfully or not.
    pub async fn settled(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

impl ImagePreloadCache {
    pub fn new(loader: Arc<dyn ImageLoader>, fetch_timeout: Duration) -> Self {
        Self { loader, fetch_timeout }
    }

    /// Issues one fetch per distinct, not yet cached reference and returns immediately.
    pub fn preload(&self, images: &[ImageRef]) -> PreloadBatch {
        let Ok(runtime) = Handle::try_current() else {
            warn!(images = images.len(), "no async runtime; skipping preload");
            return PreloadBatch::default();
        };

        let mut seen = HashSet::new();
        let handles = images
            .iter()
            .filter(|image| seen.insert(*image) && !self.loader.is_cached(image))
            .map(|image| {
                let loader = Arc::clone(&self.loader);
                let image = image.clone();
                let limit = self.fetch_timeout;
                runtime.spawn(async move {
                    if let Err(error) = bounded(limit, loader.fetch(&image)).await {
                        debug!(%image, %error, "preload failed; page will load on demand");
                    }
                })
            })
            .collect::<Vec<_>>();

        debug!(requested = images.len(), issued = handles.len(), "preload issued");
        PreloadBatch { handles }
    }
}
