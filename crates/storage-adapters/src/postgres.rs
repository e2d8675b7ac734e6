//! # PgCatalogStore
//!
//! Maps the relational catalog (see `migrations/`) onto the domain models.
//! Visibility filtering and ordering happen in SQL.

use async_trait::async_trait;
use domains::{
    CatalogStore, Consultation, Course, Department, DomainError, Exercise, ExerciseType, ImageRef, Result,
    SolutionSet,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::memory::CatalogSeed;

pub struct PgCatalogStore {
    pool: PgPool,
}

fn db_error(error: sqlx::Error) -> DomainError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DomainError::Unavailable(error.to_string())
        }
        other => DomainError::Internal(other.to_string()),
    }
}

fn department(row: &PgRow) -> std::result::Result<Department, sqlx::Error> {
    Ok(Department {
        id: row.try_get("id")?,
        faculty_id: row.try_get("faculty_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        visible: row.try_get("visible")?,
    })
}

fn course(row: &PgRow) -> std::result::Result<Course, sqlx::Error> {
    Ok(Course {
        id: row.try_get("id")?,
        department_id: row.try_get("department_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        visible: row.try_get("visible")?,
    })
}

fn exercise(row: &PgRow) -> std::result::Result<Exercise, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    Ok(Exercise {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        sequence: row.try_get("sequence")?,
        kind: kind.parse().map_err(|e: DomainError| sqlx::Error::Decode(Box::new(e)))?,
        year: row.try_get("year")?,
        description: row.try_get("description")?,
        visible: row.try_get("visible")?,
    })
}

fn solution_set(row: &PgRow) -> std::result::Result<SolutionSet, sqlx::Error> {
    let images: Vec<String> = row.try_get("images")?;
    Ok(SolutionSet {
        id: row.try_get("id")?,
        exercise_id: row.try_get("exercise_id")?,
        images: images.into_iter().map(ImageRef::new).collect(),
        visible: row.try_get("visible")?,
        created_at: row.try_get("created_at")?,
    })
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(format!("migration failed: {e}")))
    }

    /// Upserts every record of `seed` in one transaction, parents first.
    pub async fn import(&self, seed: &CatalogSeed) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for f in &seed.faculties {
            sqlx::query(
                "INSERT INTO faculties (id, name, description, image_url, visible) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET name = $2, description = $3, image_url = $4, visible = $5",
            )
            .bind(f.id)
            .bind(&f.name)
            .bind(&f.description)
            .bind(&f.image_url)
            .bind(f.visible)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for d in &seed.departments {
            sqlx::query(
                "INSERT INTO departments (id, faculty_id, name, description, image_url, visible)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (id) DO UPDATE SET faculty_id = $2, name = $3, description = $4, image_url = $5, visible = $6",
            )
            .bind(d.id)
            .bind(d.faculty_id)
            .bind(&d.name)
            .bind(&d.description)
            .bind(&d.image_url)
            .bind(d.visible)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for c in &seed.courses {
            sqlx::query(
                "INSERT INTO courses (id, department_id, name, description, visible) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET department_id = $2, name = $3, description = $4, visible = $5",
            )
            .bind(c.id)
            .bind(c.department_id)
            .bind(&c.name)
            .bind(&c.description)
            .bind(c.visible)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for e in &seed.exercises {
            sqlx::query(
                "INSERT INTO exercises (id, course_id, sequence, kind, year, description, visible)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO UPDATE SET course_id = $2, sequence = $3, kind = $4, year = $5,
                     description = $6, visible = $7",
            )
            .bind(e.id)
            .bind(e.course_id)
            .bind(e.sequence)
            .bind(e.kind.as_str())
            .bind(&e.year)
            .bind(&e.description)
            .bind(e.visible)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for s in &seed.solution_sets {
            let images: Vec<String> = s.images.iter().map(|i| i.as_str().to_owned()).collect();
            sqlx::query(
                "INSERT INTO solution_sets (id, exercise_id, images, visible, created_at) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET exercise_id = $2, images = $3, visible = $4, created_at = $5",
            )
            .bind(s.id)
            .bind(s.exercise_id)
            .bind(images)
            .bind(s.visible)
            .bind(s.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        info!(
            departments = seed.departments.len(),
            courses = seed.courses.len(),
            exercises = seed.exercises.len(),
            solution_sets = seed.solution_sets.len(),
            "catalog imported"
        );
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_departments(&self, faculty_id: Uuid) -> Result<Vec<Department>> {
        sqlx::query(
            "SELECT id, faculty_id, name, description, image_url, visible FROM departments
             WHERE faculty_id = $1 AND visible ORDER BY name",
        )
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(department)
        .collect::<std::result::Result<_, _>>()
        .map_err(db_error)
    }

    async fn list_courses(&self, department_id: Uuid) -> Result<Vec<Course>> {
        sqlx::query(
            "SELECT id, department_id, name, description, visible FROM courses
             WHERE department_id = $1 AND visible ORDER BY name",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(course)
        .collect::<std::result::Result<_, _>>()
        .map_err(db_error)
    }

    async fn list_distinct_years(&self, course_id: Uuid, kind: ExerciseType) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT year FROM exercises WHERE course_id = $1 AND kind = $2 AND visible")
            .bind(course_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn list_exercises(&self, course_id: Uuid, kind: ExerciseType, year: &str) -> Result<Vec<Exercise>> {
        sqlx::query(
            "SELECT id, course_id, sequence, kind, year, description, visible FROM exercises
             WHERE course_id = $1 AND kind = $2 AND year = $3 AND visible ORDER BY sequence",
        )
        .bind(course_id)
        .bind(kind.as_str())
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(exercise)
        .collect::<std::result::Result<_, _>>()
        .map_err(db_error)
    }

    async fn list_solution_sets(&self, exercise_id: Uuid) -> Result<Vec<SolutionSet>> {
        sqlx::query(
            "SELECT id, exercise_id, images, visible, created_at FROM solution_sets
             WHERE exercise_id = $1 AND visible ORDER BY created_at, id",
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(solution_set)
        .collect::<std::result::Result<_, _>>()
        .map_err(db_error)
    }

    async fn append_consultation(&self, consultation: Consultation) -> Result<()> {
        sqlx::query("INSERT INTO consultations (id, solution_set_id, viewer_id, viewed_at) VALUES ($1, $2, $3, $4)")
            .bind(consultation.id)
            .bind(consultation.solution_set_id)
            .bind(consultation.viewer_id)
            .bind(consultation.viewed_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
