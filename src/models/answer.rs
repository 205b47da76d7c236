// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::question::validate_choice;

/// DTO for submitting (or resubmitting) an answer to a question.
///
/// The 'answers' table holds at most one row per (user_id, question_id)
/// pair, enforced by a UNIQUE constraint; a resubmission overwrites
/// selected_option, is_correct and answered_at in place.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(custom(function = validate_choice))]
    pub selected_option: String,
}

/// The caller's score on one quiz.
#[derive(Debug, Serialize)]
pub struct QuizScore {
    /// Correct answers by this user among this quiz's questions.
    pub score: i64,
    /// Question count of the quiz; unanswered questions still count here.
    pub total: i64,
    /// round(score / total * 100, 2); 0 for a quiz with no questions.
    pub percentage: f64,
}

/// One row of the caller's answer history, joined with the owning quiz.
#[derive(Debug, Serialize, FromRow)]
pub struct AnswerRecord {
    pub id: i64,
    pub question_id: i64,
    pub quiz_id: i64,

    /// One of 'A', 'B', 'C', 'D'.
    pub selected_option: String,

    /// Derived at write time as selected_option == question.correct_option;
    /// never mutated independently.
    pub is_correct: bool,

    /// Rewritten on every submission, so it always reflects the latest one.
    pub answered_at: chrono::DateTime<chrono::Utc>,
}
