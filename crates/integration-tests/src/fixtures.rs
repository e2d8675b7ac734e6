use chrono::{DateTime, Duration, TimeZone, Utc};
use domains::{Course, Department, Exercise, ExerciseType, Faculty, ImageRef, SolutionSet};
use storage_adapters::{CatalogSeed, InMemoryCatalog};
use uuid::Uuid;

/// Sciences faculty with a Mathematics department teaching Linear Algebra.
///
/// Visible content:
/// - departments: Biology, Mathematics
/// - Linear Algebra TD: 2023 (exercises 1 and 2), 2022 (exercise 1)
/// - Linear Algebra exam: 2021 (exercise 1)
/// - TD 2023 #1 has two solution sets, pages `[a, b]` then `[c]`; TD 2023 #2 has none
///
/// Hidden or unreachable: the Archive department, an orphan department, a
/// department of another faculty, TD 2023 #3 and a draft solution set.
pub struct LinearAlgebra {
    pub faculty: Faculty,
    pub biology: Department,
    pub mathematics: Department,
    pub archive: Department,
    pub orphan: Department,
    pub foreign: Department,
    pub linear_algebra: Course,
    pub analysis: Course,
    pub hidden_course: Course,
    pub td_2023_1: Exercise,
    pub td_2023_2: Exercise,
    pub td_2023_hidden: Exercise,
    pub td_2022_1: Exercise,
    pub exam_2021_1: Exercise,
    pub first_set: SolutionSet,
    pub second_set: SolutionSet,
    pub draft_set: SolutionSet,
}

fn department(name: &str, faculty_id: Option<Uuid>, visible: bool) -> Department {
    Department {
        id: Uuid::new_v4(),
        faculty_id,
        name: name.into(),
        description: None,
        image_url: None,
        visible,
    }
}

fn course(name: &str, department_id: Uuid, visible: bool) -> Course {
    Course {
        id: Uuid::new_v4(),
        department_id,
        name: name.into(),
        description: None,
        visible,
    }
}

fn exercise(course_id: Uuid, kind: ExerciseType, year: &str, sequence: i32, visible: bool) -> Exercise {
    Exercise {
        id: Uuid::new_v4(),
        course_id,
        sequence,
        kind,
        year: year.into(),
        description: None,
        visible,
    }
}

fn solution_set(exercise_id: Uuid, pages: &[&str], created_at: DateTime<Utc>, visible: bool) -> SolutionSet {
    SolutionSet {
        id: Uuid::new_v4(),
        exercise_id,
        images: pages.iter().map(|page| ImageRef::from(*page)).collect(),
        visible,
        created_at,
    }
}

impl LinearAlgebra {
    pub fn new() -> Self {
        let faculty = Faculty {
            id: Uuid::new_v4(),
            name: "Sciences".into(),
            description: None,
            image_url: None,
            visible: true,
        };
        let mathematics = department("Mathematics", Some(faculty.id), true);
        let linear_algebra = course("Linear Algebra", mathematics.id, true);
        let td_2023_1 = exercise(linear_algebra.id, ExerciseType::PracticeSheet, "2023", 1, true);
        let published = Utc.with_ymd_and_hms(2023, 10, 2, 8, 0, 0).single().unwrap_or_else(Utc::now);

        Self {
            biology: department("Biology", Some(faculty.id), true),
            archive: department("Archive", Some(faculty.id), false),
            orphan: department("Orphaned", None, true),
            foreign: department("Law", Some(Uuid::new_v4()), true),
            analysis: course("Analysis", mathematics.id, true),
            hidden_course: course("Topology", mathematics.id, false),
            td_2023_2: exercise(linear_algebra.id, ExerciseType::PracticeSheet, "2023", 2, true),
            td_2023_hidden: exercise(linear_algebra.id, ExerciseType::PracticeSheet, "2023", 3, false),
            td_2022_1: exercise(linear_algebra.id, ExerciseType::PracticeSheet, "2022", 1, true),
            exam_2021_1: exercise(linear_algebra.id, ExerciseType::FinalExam, "2021", 1, true),
            first_set: solution_set(td_2023_1.id, &["la/td-2023-1/a.png", "la/td-2023-1/b.png"], published, true),
            second_set: solution_set(td_2023_1.id, &["la/td-2023-1/c.png"], published + Duration::days(1), true),
            draft_set: solution_set(td_2023_1.id, &["la/td-2023-1/draft.png"], published + Duration::days(2), false),
            faculty,
            mathematics,
            linear_algebra,
            td_2023_1,
        }
    }

    pub fn seed(&self) -> CatalogSeed {
        CatalogSeed {
            faculties: vec![self.faculty.clone()],
            departments: vec![
                self.biology.clone(),
                self.mathematics.clone(),
                self.archive.clone(),
                self.orphan.clone(),
                self.foreign.clone(),
            ],
            courses: vec![
                self.linear_algebra.clone(),
                self.analysis.clone(),
                self.hidden_course.clone(),
            ],
            exercises: vec![
                self.td_2023_2.clone(),
                self.td_2023_1.clone(),
                self.td_2023_hidden.clone(),
                self.td_2022_1.clone(),
                self.exam_2021_1.clone(),
            ],
            solution_sets: vec![self.draft_set.clone(), self.second_set.clone(), self.first_set.clone()],
        }
    }

    pub fn catalog(&self) -> InMemoryCatalog {
        InMemoryCatalog::from_seed(self.seed())
    }
}

impl Default for LinearAlgebra {
    fn default() -> Self {
        Self::new()
    }
}
