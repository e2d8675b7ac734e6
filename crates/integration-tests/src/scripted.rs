use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    CatalogStore, Consultation, Course, Department, DomainError, Exercise, ExerciseType, Result, SolutionSet,
};
use storage_adapters::{CatalogSeed, InMemoryCatalog};
use tokio::sync::Notify;
use uuid::Uuid;

/// Identifies one kind of store call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    Departments,
    Courses(Uuid),
    Years(Uuid, ExerciseType),
    Exercises(Uuid, ExerciseType, String),
    SolutionSets(Uuid),
    Consultation,
}

/// A held call. The store parks the next matching call until [`Hold::release`].
#[derive(Default)]
pub struct Hold {
    entered: Notify,
    released: Notify,
}

impl Hold {
    /// Resolves once the held call has reached the store.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

/// In-memory catalog with scripted holds and failures.
pub struct ScriptedStore {
    catalog: InMemoryCatalog,
    seed: CatalogSeed,
    holds: DashMap<Call, Arc<Hold>>,
    failures: DashMap<Call, DomainError>,
    calls: DashMap<Call, usize>,
    leaky_departments: AtomicBool,
}

impl ScriptedStore {
    pub fn new(seed: CatalogSeed) -> Self {
        Self {
            catalog: InMemoryCatalog::from_seed(seed.clone()),
            seed,
            holds: DashMap::new(),
            failures: DashMap::new(),
            calls: DashMap::new(),
            leaky_departments: AtomicBool::new(false),
        }
    }

    /// Parks the next `call` until the returned hold is released.
    pub fn hold(&self, call: Call) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        self.holds.insert(call, Arc::clone(&hold));
        hold
    }

    /// Makes the next `call` fail with `error`.
    pub fn fail_next(&self, call: Call, error: DomainError) {
        self.failures.insert(call, error);
    }

    /// Returns every department, hidden, orphaned and foreign ones included,
    /// the way a misbehaving backend would.
    pub fn leak_departments(&self) {
        self.leaky_departments.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, call: &Call) -> usize {
        self.calls.get(call).map(|n| *n).unwrap_or(0)
    }

    pub fn consultations(&self) -> Vec<Consultation> {
        self.catalog.consultations()
    }

    async fn script(&self, call: Call) -> Result<()> {
        *self.calls.entry(call.clone()).or_insert(0) += 1;
        let hold = self.holds.remove(&call).map(|(_, hold)| hold);
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.released.notified().await;
        }
        match self.failures.remove(&call) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogStore for ScriptedStore {
    async fn list_departments(&self, faculty_id: Uuid) -> Result<Vec<Department>> {
        self.script(Call::Departments).await?;
        if self.leaky_departments.load(Ordering::SeqCst) {
            return Ok(self.seed.departments.clone());
        }
        self.catalog.list_departments(faculty_id).await
    }

    async fn list_courses(&self, department_id: Uuid) -> Result<Vec<Course>> {
        self.script(Call::Courses(department_id)).await?;
        self.catalog.list_courses(department_id).await
    }

    async fn list_distinct_years(&self, course_id: Uuid, kind: ExerciseType) -> Result<Vec<String>> {
        self.script(Call::Years(course_id, kind)).await?;
        self.catalog.list_distinct_years(course_id, kind).await
    }

    async fn list_exercises(&self, course_id: Uuid, kind: ExerciseType, year: &str) -> Result<Vec<Exercise>> {
        self.script(Call::Exercises(course_id, kind, year.to_owned())).await?;
        self.catalog.list_exercises(course_id, kind, year).await
    }

    async fn list_solution_sets(&self, exercise_id: Uuid) -> Result<Vec<SolutionSet>> {
        self.script(Call::SolutionSets(exercise_id)).await?;
        self.catalog.list_solution_sets(exercise_id).await
    }

    async fn append_consultation(&self, consultation: Consultation) -> Result<()> {
        self.script(Call::Consultation).await?;
        self.catalog.append_consultation(consultation).await
    }
}
