use askama::Template;
use domains::{Exercise, ExerciseType};
use services::{NavLevel, NavigationState};

use crate::UiError;

struct Entry {
    number: usize,
    label: String,
    active: bool,
}

#[derive(Template)]
#[template(path = "navigation.txt")]
struct NavigationTemplate<'a> {
    breadcrumb: String,
    heading: String,
    loading: bool,
    error: String,
    entries: Vec<Entry>,
    empty: &'a str,
    hint: &'a str,
}

fn numbered<T>(items: &[T], label: impl Fn(&T) -> String, active: impl Fn(&T) -> bool) -> Vec<Entry> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| Entry {
            number: i + 1,
            label: label(item),
            active: active(item),
        })
        .collect()
}

fn inactive<T>(_: &T) -> bool {
    false
}

/// Gallery heading for an exercise reached through `state`.
pub fn exercise_title(state: &NavigationState, exercise: &Exercise) -> String {
    let course = state.course().map(|c| c.name.as_str()).unwrap_or("Exercise");
    format!(
        "{course} - {} {} - Exercise {}",
        exercise.kind.label(),
        exercise.year,
        exercise.sequence
    )
}

pub fn render_navigation(state: &NavigationState) -> Result<String, UiError> {
    let (heading, entries, empty, hint) = match state.level() {
        NavLevel::Faculty => (
            "Departments".to_owned(),
            state
                .departments()
                .map(|list| numbered(list, |d| d.name.clone(), inactive))
                .unwrap_or_default(),
            "No department is available for your faculty.",
            "`dept N` opens a department.",
        ),
        NavLevel::Course => (
            "Courses".to_owned(),
            state
                .courses()
                .map(|list| numbered(list, |c| c.name.clone(), inactive))
                .unwrap_or_default(),
            "This department has no course yet.",
            "`course N` opens a course, `back` returns to the departments.",
        ),
        NavLevel::TypeYearSelection => match state.kind() {
            None => (
                "Exercise type".to_owned(),
                numbered(&ExerciseType::ALL[..], |k| k.label().to_owned(), inactive),
                "",
                "`type td` or `type exam` lists the available years.",
            ),
            Some(kind) => (
                format!("{} years", kind.label()),
                state
                    .years()
                    .map(|list| numbered(list, String::clone, inactive))
                    .unwrap_or_default(),
                "No exercise of this type has been published.",
                "`year N` lists its exercises, `type td|exam` switches type.",
            ),
        },
        NavLevel::ExerciseList => {
            let selected = state.selected_exercise().map(|e| e.id);
            (
                "Exercises".to_owned(),
                state
                    .exercises()
                    .map(|list| {
                        numbered(
                            list,
                            |e| match &e.description {
                                Some(description) => format!("Exercise {}: {description}", e.sequence),
                                None => format!("Exercise {}", e.sequence),
                            },
                            |e| Some(e.id) == selected,
                        )
                    })
                    .unwrap_or_default(),
                "No exercise for this year.",
                "`open N` shows its solutions, `year N` switches year, `back` returns to the courses.",
            )
        }
    };

    let template = NavigationTemplate {
        breadcrumb: state.breadcrumb().join(" > "),
        heading,
        loading: state.is_loading(),
        error: state.error().map(ToString::to_string).unwrap_or_default(),
        entries,
        empty,
        hint,
    };
    Ok(template.render()?)
}
