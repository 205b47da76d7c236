// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
///
/// The correct option is part of the payload on purpose: quiz detail is
/// treated as public content and no redaction happens for readers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// The text content of the question.
    pub text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// One of 'A', 'B', 'C', 'D'.
    pub correct_option: String,
}

/// DTO for adding a question to a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question text is required."))]
    pub text: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    #[validate(custom(function = validate_choice))]
    pub correct_option: String,
}

/// DTO for partially updating a question. Absent fields stay untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_a: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_b: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_c: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_d: Option<String>,
    #[validate(custom(function = validate_choice))]
    pub correct_option: Option<String>,
}

/// Shared validator for option symbols. The schema carries a matching CHECK
/// constraint as a backstop, but rejection happens here, before any write.
pub fn validate_choice(option: &str) -> Result<(), validator::ValidationError> {
    match option {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => {
            let mut err = validator::ValidationError::new("option_must_be_a_to_d");
            err.message = Some("Option must be A, B, C, or D".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validate_choice;

    #[test]
    fn accepts_the_four_symbols() {
        for opt in ["A", "B", "C", "D"] {
            assert!(validate_choice(opt).is_ok());
        }
    }

    #[test]
    fn rejects_everything_else() {
        for opt in ["E", "a", "AB", "", "1"] {
            assert!(validate_choice(opt).is_err(), "{opt:?} should be rejected");
        }
    }
}
