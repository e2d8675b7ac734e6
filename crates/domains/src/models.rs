//! # Domain Models
//!
//! These structs represent the catalog entities the portal navigates.
//! The core only reads them, except [`Consultation`] which it appends.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Top-level academic unit. A viewer's faculty is fixed by their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub visible: bool,
}

/// Second-level grouping under a Faculty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    /// `None` marks an orphan; orphans never show up for a faculty-scoped viewer.
    pub faculty_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub visible: bool,
}

/// A teaching unit under a Department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub visible: bool,
}

/// The fixed set of exercise kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    PracticeSheet,
    FinalExam,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 2] = [ExerciseType::PracticeSheet, ExerciseType::FinalExam];

    /// Stable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PracticeSheet => "practice-sheet",
            Self::FinalExam => "final-exam",
        }
    }

    /// Short label shown to students.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PracticeSheet => "TD",
            Self::FinalExam => "Exam",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice-sheet" | "td" => Ok(Self::PracticeSheet),
            "final-exam" | "exam" | "examen" => Ok(Self::FinalExam),
            other => Err(DomainError::Validation(format!("unknown exercise type '{other}'"))),
        }
    }
}

/// One numbered practice/exam item under a Course, Type and Year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub course_id: Uuid,
    /// Unique within (course, kind, year)
    pub sequence: i32,
    pub kind: ExerciseType,
    /// Free-form label ("2023", "2022-2023", "Session 2")
    pub year: String,
    pub description: Option<String>,
    pub visible: bool,
}

/// Reference to one scanned page, resolvable by the image loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The worked solution to an Exercise, one or more pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSet {
    pub id: Uuid,
    pub exercise_id: Uuid,
    /// Insertion order is page order
    pub images: Vec<ImageRef>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a viewer opening a SolutionSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub solution_set_id: Uuid,
    pub viewer_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

impl Consultation {
    pub fn new(solution_set_id: Uuid, viewer_id: Uuid, viewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            solution_set_id,
            viewer_id,
            viewed_at,
        }
    }
}
