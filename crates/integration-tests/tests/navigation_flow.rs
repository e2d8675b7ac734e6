use std::sync::Arc;
use std::time::Duration;

use domains::ExerciseType;
use integration_tests::fixtures::LinearAlgebra;
use integration_tests::scripted::ScriptedStore;
use services::{NavLevel, NavigationController, NavigationError, Outcome};
use tokio_test::{assert_err, assert_ok};

const LIMIT: Duration = Duration::from_secs(2);

fn controller(fx: &LinearAlgebra) -> NavigationController {
    NavigationController::new(Arc::new(fx.catalog()), fx.faculty.id, LIMIT)
}

fn names<T>(items: Option<&[T]>, name: impl Fn(&T) -> String) -> Vec<String> {
    items.unwrap_or_default().iter().map(name).collect()
}

#[tokio::test]
async fn drill_down_to_exercise_list() {
    let fx = LinearAlgebra::new();
    let nav = controller(&fx);

    assert_eq!(assert_ok!(nav.open().await), Outcome::Applied);
    let state = nav.snapshot();
    assert_eq!(state.level(), NavLevel::Faculty);
    assert_eq!(
        names(state.departments(), |d| d.name.clone()),
        vec!["Biology", "Mathematics"]
    );

    assert_ok!(nav.select_department(fx.mathematics.id).await);
    let state = nav.snapshot();
    assert_eq!(state.level(), NavLevel::Course);
    assert_eq!(
        names(state.courses(), |c| c.name.clone()),
        vec!["Analysis", "Linear Algebra"]
    );

    assert_ok!(nav.select_course(fx.linear_algebra.id));
    assert_eq!(nav.level(), NavLevel::TypeYearSelection);
    assert!(nav.snapshot().years().is_none());

    assert_ok!(nav.select_type(ExerciseType::PracticeSheet).await);
    assert_eq!(nav.level(), NavLevel::TypeYearSelection);
    assert_eq!(nav.snapshot().years(), Some(&["2023".to_owned(), "2022".to_owned()][..]));

    assert_ok!(nav.select_year("2023").await);
    let state = nav.snapshot();
    assert_eq!(state.level(), NavLevel::ExerciseList);
    let sequences: Vec<i32> = state.exercises().unwrap_or_default().iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(state.breadcrumb(), vec!["Mathematics", "Linear Algebra", "TD", "2023"]);

    let chosen = assert_ok!(nav.select_exercise(fx.td_2023_1.id));
    assert_eq!(chosen.id, fx.td_2023_1.id);
    assert_eq!(nav.snapshot().selected_exercise().map(|e| e.id), Some(fx.td_2023_1.id));
}

#[tokio::test]
async fn hidden_records_are_unreachable() {
    let fx = LinearAlgebra::new();
    let nav = controller(&fx);
    nav.open().await.unwrap();

    let err = assert_err!(nav.select_department(fx.archive.id).await);
    assert!(matches!(err, NavigationError::UnknownSelection { kind: "department", .. }));

    nav.select_department(fx.mathematics.id).await.unwrap();
    assert_err!(nav.select_course(fx.hidden_course.id));

    nav.select_course(fx.linear_algebra.id).unwrap();
    nav.select_type(ExerciseType::PracticeSheet).await.unwrap();
    nav.select_year("2023").await.unwrap();
    assert_err!(nav.select_exercise(fx.td_2023_hidden.id));
}

#[tokio::test]
async fn orphan_and_foreign_departments_are_dropped() {
    let fx = LinearAlgebra::new();
    let store = ScriptedStore::new(fx.seed());
    store.leak_departments();
    let nav = NavigationController::new(Arc::new(store), fx.faculty.id, LIMIT);

    nav.open().await.unwrap();
    let listed = names(nav.snapshot().departments(), |d| d.name.clone());
    assert!(listed.contains(&"Mathematics".to_owned()));
    assert!(!listed.contains(&fx.orphan.name));
    assert!(!listed.contains(&fx.foreign.name));
    assert!(!listed.contains(&fx.archive.name));
}

#[tokio::test]
async fn changing_type_resets_year_and_exercises() {
    let fx = LinearAlgebra::new();
    let nav = controller(&fx);
    nav.open().await.unwrap();
    nav.select_department(fx.mathematics.id).await.unwrap();
    nav.select_course(fx.linear_algebra.id).unwrap();
    nav.select_type(ExerciseType::PracticeSheet).await.unwrap();
    nav.select_year("2022").await.unwrap();
    assert_eq!(nav.level(), NavLevel::ExerciseList);

    nav.select_type(ExerciseType::FinalExam).await.unwrap();
    let state = nav.snapshot();
    assert_eq!(state.level(), NavLevel::TypeYearSelection);
    assert_eq!(state.kind(), Some(ExerciseType::FinalExam));
    assert_eq!(state.years(), Some(&["2021".to_owned()][..]));
    assert!(state.year().is_none());
    assert!(state.exercises().is_none());
}

#[tokio::test]
async fn back_navigation_discards_deeper_levels() {
    let fx = LinearAlgebra::new();
    let nav = controller(&fx);
    nav.open().await.unwrap();
    nav.select_department(fx.mathematics.id).await.unwrap();
    nav.select_course(fx.linear_algebra.id).unwrap();
    nav.select_type(ExerciseType::PracticeSheet).await.unwrap();
    nav.select_year("2023").await.unwrap();

    assert_eq!(nav.go_back(), NavLevel::Course);
    let state = nav.snapshot();
    assert_eq!(state.department().map(|d| d.id), Some(fx.mathematics.id));
    assert!(state.course().is_none());
    assert!(state.kind().is_none());
    assert!(state.year().is_none());
    assert_eq!(state.breadcrumb(), vec!["Mathematics"]);

    assert_eq!(nav.go_back(), NavLevel::Faculty);
    assert!(nav.snapshot().department().is_none());
    assert_eq!(nav.go_back(), NavLevel::Faculty);
    assert!(nav.snapshot().departments().is_some());
}

#[tokio::test]
async fn switching_year_from_exercise_list() {
    let fx = LinearAlgebra::new();
    let nav = controller(&fx);
    nav.open().await.unwrap();
    nav.select_department(fx.mathematics.id).await.unwrap();
    nav.select_course(fx.linear_algebra.id).unwrap();
    nav.select_type(ExerciseType::PracticeSheet).await.unwrap();
    nav.select_year("2023").await.unwrap();
    nav.select_exercise(fx.td_2023_2.id).unwrap();

    nav.select_year("2022").await.unwrap();
    let state = nav.snapshot();
    assert_eq!(state.year(), Some("2022"));
    assert!(state.selected_exercise().is_none());
    let ids: Vec<_> = state.exercises().unwrap_or_default().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![fx.td_2022_1.id]);

    let err = assert_err!(nav.select_year("1999").await);
    assert!(matches!(err, NavigationError::UnknownSelection { kind: "year", .. }));
}
