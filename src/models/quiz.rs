// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::question::Question;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    pub title: String,

    pub description: Option<String>,

    /// Free-form topic label, 'General' when the creator did not pick one.
    pub topic: String,

    /// The creating user. Immutable after creation; only the creator may
    /// mutate or delete the quiz and its questions.
    pub creator_id: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One row of the public quiz listing, joined with creator info and a
/// question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub topic: String,
    pub creator_id: i64,
    pub creator_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub question_count: i64,
}

/// Full quiz payload with its questions, in creation order.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub topic: String,
    pub creator_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<Question>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title required"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub topic: Option<String>,
}

/// DTO for partially updating a quiz. An empty title or topic counts as
/// "not provided" and leaves the stored value alone.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub topic: Option<String>,
}
