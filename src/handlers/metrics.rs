// src/handlers/metrics.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, models::metrics::GlobalMetrics, utils::score::round2};

/// System-wide counters and average correctness. No authentication required.
pub async fn get_metrics(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;

    let total_quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await?;

    let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await?;

    let total_answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&pool)
        .await?;

    // AVG over an empty table is NULL, which maps to "no answers yet".
    let average: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(CASE WHEN is_correct = 1 THEN 100.0 ELSE 0.0 END) FROM answers",
    )
    .fetch_one(&pool)
    .await?;

    Ok(Json(GlobalMetrics {
        total_users,
        total_quizzes,
        total_questions,
        total_answers,
        average_score_percentage: round2(average.unwrap_or(0.0)),
    }))
}
