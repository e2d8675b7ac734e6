//! Behaviour every `CatalogStore` implementation must share.

use std::sync::Arc;

use chrono::Utc;
use domains::{CatalogStore, Consultation, ExerciseType};
use integration_tests::fixtures::LinearAlgebra;
use integration_tests::scripted::ScriptedStore;
use uuid::Uuid;

async fn check_contract(fx: &LinearAlgebra, store: Arc<dyn CatalogStore>) {
    let departments = store.list_departments(fx.faculty.id).await.unwrap();
    assert!(departments.iter().all(|d| d.visible && d.faculty_id == Some(fx.faculty.id)));
    let names: Vec<_> = departments.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Biology", "Mathematics"]);

    let courses = store.list_courses(fx.mathematics.id).await.unwrap();
    assert!(courses.iter().all(|c| c.visible));
    assert!(courses.windows(2).all(|w| w[0].name <= w[1].name));

    let mut years = store
        .list_distinct_years(fx.linear_algebra.id, ExerciseType::PracticeSheet)
        .await
        .unwrap();
    years.sort();
    assert_eq!(years, vec!["2022", "2023"]);

    let exercises = store
        .list_exercises(fx.linear_algebra.id, ExerciseType::PracticeSheet, "2023")
        .await
        .unwrap();
    let sequences: Vec<i32> = exercises.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);

    let sets = store.list_solution_sets(fx.td_2023_1.id).await.unwrap();
    let ids: Vec<_> = sets.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![fx.first_set.id, fx.second_set.id]);

    store
        .append_consultation(Consultation::new(fx.first_set.id, Uuid::new_v4(), Utc::now()))
        .await
        .unwrap();
    assert!(store
        .list_exercises(Uuid::new_v4(), ExerciseType::FinalExam, "2023")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn in_memory_catalog_honours_contract() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(fx.catalog());
    check_contract(&fx, store.clone()).await;
    assert_eq!(store.consultations().len(), 1);
}

#[tokio::test]
async fn scripted_store_honours_contract() {
    let fx = LinearAlgebra::new();
    let store = Arc::new(ScriptedStore::new(fx.seed()));
    check_contract(&fx, store.clone()).await;
    assert_eq!(store.consultations().len(), 1);
}

#[tokio::test]
async fn bundled_demo_catalog_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/catalog.json");
    let seed = storage_adapters::CatalogSeed::load(path).await.unwrap();
    let faculty = seed.faculties.first().map(|f| f.id).unwrap();

    let catalog = storage_adapters::InMemoryCatalog::from_seed(seed);
    assert!(catalog.faculty(faculty).is_some());
    assert!(!catalog.list_departments(faculty).await.unwrap().is_empty());
}
