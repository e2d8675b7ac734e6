//! A response that arrives after the user has moved on must never overwrite
//! the newer state.

use std::sync::Arc;
use std::time::Duration;

use domains::{ExerciseType, NoopHost};
use integration_tests::fixtures::LinearAlgebra;
use integration_tests::scripted::{Call, ScriptedStore};
use services::viewer::ViewerSession;
use services::{NavLevel, NavigationController, Outcome, SolutionResolver};

const LIMIT: Duration = Duration::from_secs(5);

async fn at_course_list(fx: &LinearAlgebra, store: &Arc<ScriptedStore>) -> NavigationController {
    let nav = NavigationController::new(store.clone(), fx.faculty.id, LIMIT);
    nav.open().await.unwrap();
    nav.select_department(fx.mathematics.id).await.unwrap();
    nav
}

async fn at_year_selection(fx: &LinearAlgebra, store: &Arc<ScriptedStore>) -> NavigationController {
    let nav = at_course_list(fx, store).await;
    nav.select_course(fx.linear_algebra.id).unwrap();
    nav.select_type(ExerciseType::PracticeSheet).await.unwrap();
    nav
}

#[tokio::test]
async fn late_year_response_is_discarded() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    let nav = at_year_selection(&fx, &store).await;

    let hold = store.hold(Call::Exercises(
        fx.linear_algebra.id,
        ExerciseType::PracticeSheet,
        "2023".into(),
    ));
    let first = tokio::spawn({
        let nav = nav.clone();
        async move { nav.select_year("2023").await }
    });
    hold.entered().await;

    assert_eq!(nav.select_year("2022").await.unwrap(), Outcome::Applied);
    hold.release();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);

    let state = nav.snapshot();
    assert_eq!(state.year(), Some("2022"));
    let ids: Vec<_> = state.exercises().unwrap_or_default().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![fx.td_2022_1.id]);
}

#[tokio::test]
async fn late_course_list_after_back_and_reselect() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    let nav = NavigationController::new(store.clone(), fx.faculty.id, LIMIT);
    nav.open().await.unwrap();

    let hold = store.hold(Call::Courses(fx.mathematics.id));
    let first = tokio::spawn({
        let nav = nav.clone();
        let id = fx.mathematics.id;
        async move { nav.select_department(id).await }
    });
    hold.entered().await;

    assert_eq!(nav.go_back(), NavLevel::Faculty);
    nav.select_department(fx.biology.id).await.unwrap();
    hold.release();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);

    let state = nav.snapshot();
    assert_eq!(state.department().map(|d| d.id), Some(fx.biology.id));
    assert_eq!(state.courses().map(<[_]>::len), Some(0));
}

#[tokio::test]
async fn late_years_after_type_switch() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    let nav = at_course_list(&fx, &store).await;
    nav.select_course(fx.linear_algebra.id).unwrap();

    let hold = store.hold(Call::Years(fx.linear_algebra.id, ExerciseType::PracticeSheet));
    let first = tokio::spawn({
        let nav = nav.clone();
        async move { nav.select_type(ExerciseType::PracticeSheet).await }
    });
    hold.entered().await;

    nav.select_type(ExerciseType::FinalExam).await.unwrap();
    hold.release();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);

    let state = nav.snapshot();
    assert_eq!(state.kind(), Some(ExerciseType::FinalExam));
    assert_eq!(state.years(), Some(&["2021".to_owned()][..]));
}

#[tokio::test]
async fn going_back_leaves_in_flight_fetch_unapplied() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    let nav = at_year_selection(&fx, &store).await;

    let hold = store.hold(Call::Exercises(
        fx.linear_algebra.id,
        ExerciseType::PracticeSheet,
        "2023".into(),
    ));
    let first = tokio::spawn({
        let nav = nav.clone();
        async move { nav.select_year("2023").await }
    });
    hold.entered().await;

    assert_eq!(nav.go_back(), NavLevel::Course);
    nav.select_course(fx.analysis.id).unwrap();
    hold.release();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);

    let state = nav.snapshot();
    assert_eq!(state.course().map(|c| c.id), Some(fx.analysis.id));
    assert!(state.kind().is_none());
    assert!(state.exercises().is_none());
}

#[tokio::test]
async fn late_resolution_does_not_replace_gallery() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    let resolver = SolutionResolver::new(store.clone(), LIMIT);
    let session = ViewerSession::new(resolver, Arc::new(NoopHost), uuid::Uuid::new_v4());

    let hold = store.hold(Call::SolutionSets(fx.td_2023_1.id));
    let first = tokio::spawn({
        let session = session.clone();
        let id = fx.td_2023_1.id;
        async move { session.open_exercise(id, "TD 2023 #1").await }
    });
    hold.entered().await;

    assert_eq!(
        session.open_exercise(fx.td_2023_2.id, "TD 2023 #2").await.unwrap(),
        Outcome::Applied
    );
    hold.release();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);

    let (title, pages) = session
        .with_gallery(|g| (g.title().to_owned(), g.images().len()))
        .unwrap();
    assert_eq!(title, "TD 2023 #2");
    assert_eq!(pages, 0);
}
