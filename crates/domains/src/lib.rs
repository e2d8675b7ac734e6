//! solution-portal/crates/domains/src/lib.rs
//!
//! Catalog entities, collaborator ports and the shared error type.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use std::str::FromStr;

    #[test]
    fn test_exercise_type_parses_labels_and_keys() {
        assert_eq!(ExerciseType::from_str("TD").unwrap(), ExerciseType::PracticeSheet);
        assert_eq!(ExerciseType::from_str(" examen ").unwrap(), ExerciseType::FinalExam);
        assert_eq!(ExerciseType::from_str("final-exam").unwrap(), ExerciseType::FinalExam);
        assert!(ExerciseType::from_str("quiz").is_err());
    }

    #[test]
    fn test_exercise_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ExerciseType::PracticeSheet).unwrap();
        assert_eq!(json, "\"practice-sheet\"");
        let parsed: ExerciseType = serde_json::from_str("\"final-exam\"").unwrap();
        assert_eq!(parsed, ExerciseType::FinalExam);
    }

    #[test]
    fn test_image_ref_is_a_plain_string_on_the_wire() {
        let set = SolutionSet {
            id: uuid::Uuid::new_v4(),
            exercise_id: uuid::Uuid::new_v4(),
            images: vec![ImageRef::from("a.png"), ImageRef::from("b.png")],
            visible: true,
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["images"], serde_json::json!(["a.png", "b.png"]));
    }

    #[test]
    fn test_consultation_gets_fresh_id() {
        let set_id = uuid::Uuid::new_v4();
        let viewer = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();
        let a = Consultation::new(set_id, viewer, now);
        let b = Consultation::new(set_id, viewer, now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.solution_set_id, b.solution_set_id);
    }
}
