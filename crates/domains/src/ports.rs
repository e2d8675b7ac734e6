//! # Core Traits (Ports)
//!
//! Every collaborator the core talks to is one of these traits, handed to the
//! services at construction. Adapters live in `storage-adapters`; tests use the
//! mockall doubles behind the `testing` feature.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Consultation, Course, Department, Exercise, ExerciseType, ImageRef, SolutionSet};

/// Read access to the catalog plus the append-only consultation log.
///
/// Every list query returns visible records only, in the order documented on
/// the method. Visibility is filtered per entity; a hidden parent does not hide
/// its children.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Departments of a faculty, ordered by name.
    async fn list_departments(&self, faculty_id: Uuid) -> Result<Vec<Department>>;

    /// Courses of a department, ordered by name.
    async fn list_courses(&self, department_id: Uuid) -> Result<Vec<Course>>;

    /// Distinct year labels having at least one visible exercise of `kind`.
    /// No ordering guarantee; callers sort.
    async fn list_distinct_years(&self, course_id: Uuid, kind: ExerciseType) -> Result<Vec<String>>;

    /// Exercises for (course, kind, year), ordered by sequence ascending.
    async fn list_exercises(&self, course_id: Uuid, kind: ExerciseType, year: &str) -> Result<Vec<Exercise>>;

    /// Solution sets of an exercise in a stable order (creation order).
    async fn list_solution_sets(&self, exercise_id: Uuid) -> Result<Vec<SolutionSet>>;

    async fn append_consultation(&self, consultation: Consultation) -> Result<()>;
}

/// Fetch-and-cache contract for scanned pages.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Makes `image` available for immediate display. Idempotent.
    async fn fetch(&self, image: &ImageRef) -> Result<()>;

    /// Whether `image` is already cached.
    fn is_cached(&self, image: &ImageRef) -> bool;
}

/// Side effects the lightbox needs from the runtime hosting it.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ViewerHost: Send + Sync {
    fn suspend_background_scroll(&self);
    fn restore_background_scroll(&self);
    /// Routes key presses to the viewer.
    fn capture_keys(&self);
    fn release_keys(&self);
}

/// Host for headless use: all effects are no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl ViewerHost for NoopHost {
    fn suspend_background_scroll(&self) {}
    fn restore_background_scroll(&self) {}
    fn capture_keys(&self) {}
    fn release_keys(&self) {}
}
