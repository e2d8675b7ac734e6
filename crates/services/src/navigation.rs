//! # NavigationController
//!
//! Drill-down through the catalog: the viewer's faculty lists its departments,
//! a department lists its courses, a course opens the type/year selection and a
//! year lists the exercises.
//!
//! The state is a tree of nested levels rather than a set of flags: a deeper
//! level only exists inside the level that selected it, so popping a level
//! drops everything fetched below it in one assignment.
//!
//! Every fetch is tagged with a [`RequestToken`] stored in the slot it will fill.
//! When the response arrives the slot is looked up again; if it no longer holds
//! that token (re-selection, back navigation, retry) the response is discarded.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use domains::{CatalogStore, Course, Department, DomainError, Exercise, ExerciseType};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::request::{bounded, RequestToken, TokenSource};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Which listing the viewer is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavLevel {
    /// The faculty's department list.
    Faculty,
    /// The course list of the chosen department.
    Course,
    /// Type and year pickers for the chosen course.
    TypeYearSelection,
    ExerciseList,
}

impl fmt::Display for NavLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Faculty => "faculty",
            Self::Course => "course",
            Self::TypeYearSelection => "type/year selection",
            Self::ExerciseList => "exercise list",
        })
    }
}

/// Fetch state of one listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Idle,
    Loading(RequestToken),
    Ready(T),
    Failed(DomainError),
}

impl<T> Slot<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn awaits(&self, token: RequestToken) -> bool {
        matches!(self, Self::Loading(pending) if *pending == token)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub faculty_id: Uuid,
    pub departments: Slot<Vec<Department>>,
    pub department: Option<DepartmentLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentLevel {
    pub department: Department,
    pub courses: Slot<Vec<Course>>,
    pub course: Option<CourseLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseLevel {
    pub course: Course,
    pub choice: TypeChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeChoice {
    Unchosen,
    Chosen {
        kind: ExerciseType,
        years: Slot<Vec<String>>,
        year: Option<YearLevel>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearLevel {
    pub year: String,
    pub exercises: Slot<Vec<Exercise>>,
    pub exercise: Option<Uuid>,
}

impl NavigationState {
    fn new(faculty_id: Uuid) -> Self {
        Self {
            faculty_id,
            departments: Slot::Idle,
            department: None,
        }
    }

    pub fn level(&self) -> NavLevel {
        let Some(department) = &self.department else {
            return NavLevel::Faculty;
        };
        match &department.course {
            None => NavLevel::Course,
            Some(CourseLevel {
                choice: TypeChoice::Chosen { year: Some(_), .. },
                ..
            }) => NavLevel::ExerciseList,
            Some(_) => NavLevel::TypeYearSelection,
        }
    }

    pub fn department(&self) -> Option<&Department> {
        self.department.as_ref().map(|level| &level.department)
    }

    pub fn course(&self) -> Option<&Course> {
        self.course_level().map(|level| &level.course)
    }

    pub fn kind(&self) -> Option<ExerciseType> {
        match self.course_level()?.choice {
            TypeChoice::Chosen { kind, .. } => Some(kind),
            TypeChoice::Unchosen => None,
        }
    }

    pub fn year(&self) -> Option<&str> {
        self.year_level().map(|level| level.year.as_str())
    }

    pub fn departments(&self) -> Option<&[Department]> {
        self.departments.ready().map(Vec::as_slice)
    }

    pub fn courses(&self) -> Option<&[Course]> {
        self.department.as_ref()?.courses.ready().map(Vec::as_slice)
    }

    pub fn years(&self) -> Option<&[String]> {
        self.years_ref()?.ready().map(Vec::as_slice)
    }

    pub fn exercises(&self) -> Option<&[Exercise]> {
        self.year_level()?.exercises.ready().map(Vec::as_slice)
    }

    pub fn selected_exercise(&self) -> Option<&Exercise> {
        let level = self.year_level()?;
        let id = level.exercise?;
        level.exercises.ready()?.iter().find(|exercise| exercise.id == id)
    }

    /// Error of the current level's listing, if its last fetch failed.
    pub fn error(&self) -> Option<&DomainError> {
        match self.level() {
            NavLevel::Faculty => self.departments.error(),
            NavLevel::Course => self.department.as_ref().and_then(|level| level.courses.error()),
            NavLevel::TypeYearSelection => self.years_ref().and_then(Slot::error),
            NavLevel::ExerciseList => self.year_level().and_then(|level| level.exercises.error()),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self.level() {
            NavLevel::Faculty => self.departments.is_loading(),
            NavLevel::Course => self.department.as_ref().is_some_and(|level| level.courses.is_loading()),
            NavLevel::TypeYearSelection => self.years_ref().is_some_and(Slot::is_loading),
            NavLevel::ExerciseList => self.year_level().is_some_and(|level| level.exercises.is_loading()),
        }
    }

    /// Names of the choices made so far, outermost first.
    pub fn breadcrumb(&self) -> Vec<String> {
        let mut crumbs = Vec::new();
        let Some(department) = &self.department else {
            return crumbs;
        };
        crumbs.push(department.department.name.clone());
        let Some(course) = &department.course else {
            return crumbs;
        };
        crumbs.push(course.course.name.clone());
        if let TypeChoice::Chosen { kind, year, .. } = &course.choice {
            crumbs.push(kind.label().to_owned());
            if let Some(year) = year {
                crumbs.push(year.year.clone());
            }
        }
        crumbs
    }

    fn course_level(&self) -> Option<&CourseLevel> {
        self.department.as_ref()?.course.as_ref()
    }

    fn course_level_mut(&mut self) -> Option<&mut CourseLevel> {
        self.department.as_mut()?.course.as_mut()
    }

    fn years_ref(&self) -> Option<&Slot<Vec<String>>> {
        match &self.course_level()?.choice {
            TypeChoice::Chosen { years, .. } => Some(years),
            TypeChoice::Unchosen => None,
        }
    }

    fn year_level(&self) -> Option<&YearLevel> {
        match &self.course_level()?.choice {
            TypeChoice::Chosen { year, .. } => year.as_ref(),
            TypeChoice::Unchosen => None,
        }
    }

    fn year_level_mut(&mut self) -> Option<&mut YearLevel> {
        match &mut self.course_level_mut()?.choice {
            TypeChoice::Chosen { year, .. } => year.as_mut(),
            TypeChoice::Unchosen => None,
        }
    }

    // Slot locators used when a response comes back.

    fn departments_slot(&mut self) -> Option<&mut Slot<Vec<Department>>> {
        Some(&mut self.departments)
    }

    fn courses_slot(&mut self) -> Option<&mut Slot<Vec<Course>>> {
        self.department.as_mut().map(|level| &mut level.courses)
    }

    fn years_slot(&mut self) -> Option<&mut Slot<Vec<String>>> {
        match &mut self.course_level_mut()?.choice {
            TypeChoice::Chosen { years, .. } => Some(years),
            TypeChoice::Unchosen => None,
        }
    }

    fn exercises_slot(&mut self) -> Option<&mut Slot<Vec<Exercise>>> {
        self.year_level_mut().map(|level| &mut level.exercises)
    }

    /// Puts the failed listing of the current level back in flight.
    fn reissue(&mut self, token: RequestToken) -> Option<Request> {
        let faculty_id = self.faculty_id;
        match self.level() {
            NavLevel::Faculty => {
                if !self.departments.is_failed() {
                    return None;
                }
                self.departments = Slot::Loading(token);
                Some(Request::Departments(faculty_id))
            }
            NavLevel::Course => {
                let level = self.department.as_mut()?;
                if !level.courses.is_failed() {
                    return None;
                }
                level.courses = Slot::Loading(token);
                Some(Request::Courses(level.department.id))
            }
            NavLevel::TypeYearSelection => {
                let level = self.course_level_mut()?;
                let course_id = level.course.id;
                match &mut level.choice {
                    TypeChoice::Chosen { kind, years, .. } if years.is_failed() => {
                        *years = Slot::Loading(token);
                        Some(Request::Years(course_id, *kind))
                    }
                    _ => None,
                }
            }
            NavLevel::ExerciseList => {
                let level = self.course_level_mut()?;
                let course_id = level.course.id;
                match &mut level.choice {
                    TypeChoice::Chosen {
                        kind,
                        year: Some(year),
                        ..
                    } if year.exercises.is_failed() => {
                        year.exercises = Slot::Loading(token);
                        Some(Request::Exercises(course_id, *kind, year.year.clone()))
                    }
                    _ => None,
                }
            }
        }
    }
}

/// What happened to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer selection replaced the one this response was for.
    Superseded,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    #[error("cannot {op} at the {level} level")]
    InvalidTransition { op: &'static str, level: NavLevel },

    #[error("{kind} '{id}' is not in the current listing")]
    UnknownSelection { kind: &'static str, id: String },

    #[error("nothing to retry at the {0} level")]
    NothingToRetry(NavLevel),

    #[error(transparent)]
    Fetch(#[from] DomainError),
}

impl NavigationError {
    fn unknown(kind: &'static str, id: impl fmt::Display) -> Self {
        Self::UnknownSelection {
            kind,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Request {
    Departments(Uuid),
    Courses(Uuid),
    Years(Uuid, ExerciseType),
    Exercises(Uuid, ExerciseType, String),
}

/// Shared handle on one viewer's drill-down. Cloning yields another handle on
/// the same state, so a UI can fire a selection while an earlier one is still
/// in flight.
#[derive(Clone)]
pub struct NavigationController {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn CatalogStore>,
    tokens: TokenSource,
    fetch_timeout: Duration,
    state: Mutex<NavigationState>,
}

impl NavigationController {
    pub fn new(store: Arc<dyn CatalogStore>, faculty_id: Uuid, fetch_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                tokens: TokenSource::default(),
                fetch_timeout,
                state: Mutex::new(NavigationState::new(faculty_id)),
            }),
        }
    }

    pub fn snapshot(&self) -> NavigationState {
        self.state().clone()
    }

    pub fn level(&self) -> NavLevel {
        self.state().level()
    }

    /// Loads (or reloads) the faculty's department list and resets everything below it.
    pub async fn open(&self) -> Result<Outcome, NavigationError> {
        let (token, faculty_id) = {
            let mut state = self.state();
            let token = self.inner.tokens.issue();
            state.department = None;
            state.departments = Slot::Loading(token);
            (token, state.faculty_id)
        };
        self.run(token, Request::Departments(faculty_id)).await
    }

    pub async fn select_department(&self, department_id: Uuid) -> Result<Outcome, NavigationError> {
        let token = {
            let mut state = self.state();
            expect_level(&state, "select a department", &[NavLevel::Faculty])?;
            let department = state
                .departments()
                .and_then(|list| list.iter().find(|d| d.id == department_id))
                .cloned()
                .ok_or_else(|| NavigationError::unknown("department", department_id))?;
            let token = self.inner.tokens.issue();
            debug!(token = %token, department = %department.name, "department selected");
            state.department = Some(DepartmentLevel {
                department,
                courses: Slot::Loading(token),
                course: None,
            });
            token
        };
        self.run(token, Request::Courses(department_id)).await
    }

    /// Opens the type/year selection for a course. Nothing is fetched until a type is picked.
    pub fn select_course(&self, course_id: Uuid) -> Result<(), NavigationError> {
        let mut state = self.state();
        let level = expect_level(&state, "select a course", &[NavLevel::Course, NavLevel::TypeYearSelection])?;
        let Some(department) = state.department.as_mut() else {
            return Err(NavigationError::InvalidTransition {
                op: "select a course",
                level,
            });
        };
        let course = department
            .courses
            .ready()
            .and_then(|list| list.iter().find(|c| c.id == course_id))
            .cloned()
            .ok_or_else(|| NavigationError::unknown("course", course_id))?;
        debug!(course = %course.name, "course selected");
        department.course = Some(CourseLevel {
            course,
            choice: TypeChoice::Unchosen,
        });
        Ok(())
    }

    /// Picks the exercise type and fetches its year labels, most recent first.
    /// From the exercise list this switches type and drops the chosen year.
    pub async fn select_type(&self, kind: ExerciseType) -> Result<Outcome, NavigationError> {
        let (token, course_id) = {
            let mut state = self.state();
            let level = expect_level(
                &state,
                "select a type",
                &[NavLevel::TypeYearSelection, NavLevel::ExerciseList],
            )?;
            let token = self.inner.tokens.issue();
            let Some(course) = state.course_level_mut() else {
                return Err(NavigationError::InvalidTransition {
                    op: "select a type",
                    level,
                });
            };
            debug!(token = %token, kind = %kind, course = %course.course.name, "type selected");
            course.choice = TypeChoice::Chosen {
                kind,
                years: Slot::Loading(token),
                year: None,
            };
            (token, course.course.id)
        };
        self.run(token, Request::Years(course_id, kind)).await
    }

    /// Picks a year from the fetched labels and lists its exercises. Also valid
    /// from the exercise list to switch years.
    pub async fn select_year(&self, year: &str) -> Result<Outcome, NavigationError> {
        let (token, course_id, kind) = {
            let mut state = self.state();
            let op = "select a year";
            let level = expect_level(&state, op, &[NavLevel::TypeYearSelection, NavLevel::ExerciseList])?;
            let token = self.inner.tokens.issue();
            let Some(course) = state.course_level_mut() else {
                return Err(NavigationError::InvalidTransition { op, level });
            };
            let course_id = course.course.id;
            let TypeChoice::Chosen {
                kind,
                years,
                year: chosen,
            } = &mut course.choice
            else {
                return Err(NavigationError::InvalidTransition { op, level });
            };
            if !years.ready().is_some_and(|list| list.iter().any(|y| y == year)) {
                return Err(NavigationError::unknown("year", year));
            }
            debug!(token = %token, year, "year selected");
            *chosen = Some(YearLevel {
                year: year.to_owned(),
                exercises: Slot::Loading(token),
                exercise: None,
            });
            (token, course_id, *kind)
        };
        self.run(token, Request::Exercises(course_id, kind, year.to_owned())).await
    }

    /// Marks an exercise of the current list as the one being opened.
    pub fn select_exercise(&self, exercise_id: Uuid) -> Result<Exercise, NavigationError> {
        let mut state = self.state();
        let level = expect_level(&state, "select an exercise", &[NavLevel::ExerciseList])?;
        let Some(year) = state.year_level_mut() else {
            return Err(NavigationError::InvalidTransition {
                op: "select an exercise",
                level,
            });
        };
        let exercise = year
            .exercises
            .ready()
            .and_then(|list| list.iter().find(|e| e.id == exercise_id))
            .cloned()
            .ok_or_else(|| NavigationError::unknown("exercise", exercise_id))?;
        year.exercise = Some(exercise.id);
        Ok(exercise)
    }

    /// Pops one level and returns the level now shown. The type/year selection
    /// and the exercise list both belong to the chosen course, so popping either
    /// returns to the course list. Popping the faculty level does nothing.
    pub fn go_back(&self) -> NavLevel {
        let mut state = self.state();
        let from = state.level();
        match from {
            NavLevel::ExerciseList | NavLevel::TypeYearSelection => {
                if let Some(department) = state.department.as_mut() {
                    department.course = None;
                }
            }
            NavLevel::Course => state.department = None,
            NavLevel::Faculty => {}
        }
        let to = state.level();
        debug!(%from, %to, "navigated back");
        to
    }

    /// Re-issues the failed fetch of the current level.
    pub async fn retry(&self) -> Result<Outcome, NavigationError> {
        let (token, request) = {
            let mut state = self.state();
            let level = state.level();
            let token = self.inner.tokens.issue();
            let request = state.reissue(token).ok_or(NavigationError::NothingToRetry(level))?;
            debug!(token = %token, %level, "retrying");
            (token, request)
        };
        self.run(token, request).await
    }

    fn state(&self) -> MutexGuard<'_, NavigationState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, token: RequestToken, request: Request) -> Result<Outcome, NavigationError> {
        let store = &self.inner.store;
        let limit = self.inner.fetch_timeout;
        debug!(token = %token, ?request, "navigation fetch issued");

        match request {
            Request::Departments(faculty_id) => {
                let result = bounded(limit, store.list_departments(faculty_id)).await.map(|list| {
                    list.into_iter()
                        .filter(|d| d.visible && d.faculty_id == Some(faculty_id))
                        .collect::<Vec<_>>()
                });
                self.settle(token, result, NavigationState::departments_slot)
            }
            Request::Courses(department_id) => {
                let result = bounded(limit, store.list_courses(department_id)).await.map(|list| {
                    list.into_iter()
                        .filter(|c| c.visible && c.department_id == department_id)
                        .collect::<Vec<_>>()
                });
                self.settle(token, result, NavigationState::courses_slot)
            }
            Request::Years(course_id, kind) => {
                let result = bounded(limit, store.list_distinct_years(course_id, kind))
                    .await
                    .map(most_recent_first);
                self.settle(token, result, NavigationState::years_slot)
            }
            Request::Exercises(course_id, kind, year) => {
                let result = bounded(limit, store.list_exercises(course_id, kind, &year)).await.map(|list| {
                    list.into_iter()
                        .filter(|e| e.visible && e.course_id == course_id && e.kind == kind && e.year == year)
                        .collect::<Vec<_>>()
                });
                self.settle(token, result, NavigationState::exercises_slot)
            }
        }
    }

    fn settle<T>(
        &self,
        token: RequestToken,
        result: domains::Result<T>,
        locate: fn(&mut NavigationState) -> Option<&mut Slot<T>>,
    ) -> Result<Outcome, NavigationError> {
        let mut state = self.state();
        let Some(slot) = locate(&mut *state).filter(|slot| slot.awaits(token)) else {
            debug!(token = %token, "discarding stale navigation response");
            return Ok(Outcome::Superseded);
        };
        match result {
            Ok(value) => {
                *slot = Slot::Ready(value);
                Ok(Outcome::Applied)
            }
            Err(error) => {
                warn!(token = %token, %error, "navigation fetch failed");
                *slot = Slot::Failed(error.clone());
                Err(NavigationError::Fetch(error))
            }
        }
    }
}

fn expect_level(
    state: &NavigationState,
    op: &'static str,
    allowed: &[NavLevel],
) -> Result<NavLevel, NavigationError> {
    let level = state.level();
    if allowed.contains(&level) {
        Ok(level)
    } else {
        Err(NavigationError::InvalidTransition { op, level })
    }
}

/// Year labels are free-form; descending lexical order puts "2024" before "2023".
fn most_recent_first(mut years: Vec<String>) -> Vec<String> {
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
