//! # SolutionResolver
//!
//! Turns an exercise into the flat, ordered page list the viewers share and
//! records that the viewer opened it. The consultation write runs detached:
//! pages are returned as soon as the solution sets are known.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domains::{CatalogStore, Consultation, ImageRef, SolutionSet};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::preload::ImagePreloadCache;
use crate::request::bounded;

/// Result of one "open exercise" action.
#[derive(Debug)]
pub struct Resolution {
    pub exercise_id: Uuid,
    /// Pages of every solution set, set order then page order. Never mutated.
    pub images: Arc<[ImageRef]>,
    pub solution_sets: usize,
    /// Issued when at least one solution set exists.
    pub consultation: Option<ConsultationWrite>,
}

impl Resolution {
    /// No solution set yet; the caller shows an explicit empty state.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// A consultation write in flight. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct ConsultationWrite {
    solution_set_id: Uuid,
    handle: JoinHandle<bool>,
}

impl ConsultationWrite {
    pub fn solution_set_id(&self) -> Uuid {
        self.solution_set_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the write; `false` when it failed or timed out.
    pub async fn recorded(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct SolutionResolver {
    store: Arc<dyn CatalogStore>,
    preload: Option<ImagePreloadCache>,
    fetch_timeout: Duration,
}

impl SolutionResolver {
    pub fn new(store: Arc<dyn CatalogStore>, fetch_timeout: Duration) -> Self {
        Self {
            store,
            preload: None,
            fetch_timeout,
        }
    }

    /// Warm `cache` with every resolved list before it is returned.
    pub fn with_preload(mut self, cache: ImagePreloadCache) -> Self {
        self.preload = Some(cache);
        self
    }

    /// Fetches the visible solution sets of `exercise_id`, flattens their pages
    /// and issues one consultation against the first set.
    ///
    /// Only the solution-set fetch can fail the call. Neither the preload nor
    /// the consultation write is awaited.
    pub async fn resolve(&self, exercise_id: Uuid, viewer_id: Uuid) -> domains::Result<Resolution> {
        let sets: Vec<SolutionSet> = bounded(self.fetch_timeout, self.store.list_solution_sets(exercise_id))
            .await?
            .into_iter()
            .filter(|set| set.visible && set.exercise_id == exercise_id)
            .collect();

        let images: Arc<[ImageRef]> = flatten(&sets).into();
        if let Some(cache) = &self.preload {
            cache.preload(&images);
        }

        let consultation = sets.first().map(|first| self.log_consultation(first.id, viewer_id));

        info!(
            %exercise_id,
            solution_sets = sets.len(),
            images = images.len(),
            consultation = consultation.is_some(),
            "exercise resolved"
        );

        Ok(Resolution {
            exercise_id,
            images,
            solution_sets: sets.len(),
            consultation,
        })
    }

    fn log_consultation(&self, solution_set_id: Uuid, viewer_id: Uuid) -> ConsultationWrite {
        let store = Arc::clone(&self.store);
        let limit = self.fetch_timeout;
        let consultation = Consultation::new(solution_set_id, viewer_id, Utc::now());
        let handle = tokio::spawn(async move {
            match bounded(limit, store.append_consultation(consultation)).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(%solution_set_id, %viewer_id, %error, "consultation not recorded");
                    false
                }
            }
        });
        ConsultationWrite {
            solution_set_id,
            handle,
        }
    }
}

/// Concatenates the pages of `sets` in order.
pub fn flatten(sets: &[SolutionSet]) -> Vec<ImageRef> {
    sets.iter().flat_map(|set| set.images.iter().cloned()).collect()
}
