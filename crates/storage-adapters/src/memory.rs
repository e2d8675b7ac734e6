//! # InMemoryCatalog
//!
//! Catalog held in dashmaps, loaded from a JSON [`CatalogSeed`]. Used by the
//! terminal front-end's `memory` backend and as the reference behaviour for
//! the SQL adapter.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    CatalogStore, Consultation, Course, Department, DomainError, Exercise, ExerciseType, Faculty, Result,
    SolutionSet,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Whole-catalog document. Every list defaults to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub faculties: Vec<Faculty>,
    pub departments: Vec<Department>,
    pub courses: Vec<Course>,
    pub exercises: Vec<Exercise>,
    pub solution_sets: Vec<SolutionSet>,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::Validation(format!("invalid catalog: {e}")))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Internal(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    faculties: DashMap<Uuid, Faculty>,
    departments: DashMap<Uuid, Department>,
    courses: DashMap<Uuid, Course>,
    exercises: DashMap<Uuid, Exercise>,
    solution_sets: DashMap<Uuid, SolutionSet>,
    consultations: RwLock<Vec<Consultation>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = Self::new();
        catalog.extend(seed);
        catalog
    }

    /// Inserts or replaces every record of `seed`, keyed by id.
    pub fn extend(&self, seed: CatalogSeed) {
        let counts = (
            seed.faculties.len(),
            seed.departments.len(),
            seed.courses.len(),
            seed.exercises.len(),
            seed.solution_sets.len(),
        );
        for f in seed.faculties {
            self.faculties.insert(f.id, f);
        }
        for d in seed.departments {
            self.departments.insert(d.id, d);
        }
        for c in seed.courses {
            self.courses.insert(c.id, c);
        }
        for e in seed.exercises {
            self.exercises.insert(e.id, e);
        }
        for s in seed.solution_sets {
            self.solution_sets.insert(s.id, s);
        }
        info!(
            faculties = counts.0,
            departments = counts.1,
            courses = counts.2,
            exercises = counts.3,
            solution_sets = counts.4,
            "catalog loaded"
        );
    }

    pub fn faculty(&self, id: Uuid) -> Option<Faculty> {
        self.faculties.get(&id).map(|f| f.value().clone())
    }

    /// Consultations appended so far, oldest first.
    pub fn consultations(&self) -> Vec<Consultation> {
        self.consultations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_departments(&self, faculty_id: Uuid) -> Result<Vec<Department>> {
        let mut list: Vec<Department> = self
            .departments
            .iter()
            .filter(|d| d.visible && d.faculty_id == Some(faculty_id))
            .map(|d| d.value().clone())
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn list_courses(&self, department_id: Uuid) -> Result<Vec<Course>> {
        let mut list: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| c.visible && c.department_id == department_id)
            .map(|c| c.value().clone())
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn list_distinct_years(&self, course_id: Uuid, kind: ExerciseType) -> Result<Vec<String>> {
        let mut years: Vec<String> = self
            .exercises
            .iter()
            .filter(|e| e.visible && e.course_id == course_id && e.kind == kind)
            .map(|e| e.year.clone())
            .collect();
        years.sort();
        years.dedup();
        Ok(years)
    }

    async fn list_exercises(&self, course_id: Uuid, kind: ExerciseType, year: &str) -> Result<Vec<Exercise>> {
        let mut list: Vec<Exercise> = self
            .exercises
            .iter()
            .filter(|e| e.visible && e.course_id == course_id && e.kind == kind && e.year == year)
            .map(|e| e.value().clone())
            .collect();
        list.sort_by_key(|e| e.sequence);
        Ok(list)
    }

    async fn list_solution_sets(&self, exercise_id: Uuid) -> Result<Vec<SolutionSet>> {
        let mut list: Vec<SolutionSet> = self
            .solution_sets
            .iter()
            .filter(|s| s.visible && s.exercise_id == exercise_id)
            .map(|s| s.value().clone())
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn append_consultation(&self, consultation: Consultation) -> Result<()> {
        if !self.solution_sets.contains_key(&consultation.solution_set_id) {
            return Err(DomainError::NotFound(
                "SolutionSet".into(),
                consultation.solution_set_id.to_string(),
            ));
        }
        debug!(solution_set_id = %consultation.solution_set_id, "consultation appended");
        self.consultations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(consultation);
        Ok(())
    }
}
