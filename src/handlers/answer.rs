// src/handlers/answer.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::answer::{QuizScore, SubmitAnswerRequest},
    utils::{jwt::Claims, score::round2},
};

/// Submits (or resubmits) an answer to one question of a quiz.
///
/// * The question must belong to the quiz named in the path; a mismatched
///   pair is indistinguishable from a missing question.
/// * Correctness is derived here, against the question's current
///   correct_option, and stored with the answer.
/// * At most one answer row exists per (user, question): the write is an
///   upsert riding on the UNIQUE constraint, so concurrent submissions
///   cannot produce two rows. A resubmission overwrites selected_option,
///   is_correct and answered_at in place.
pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((quiz_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    // Resolve the question first: a request against a missing (or
    // mismatched) question is 404 even when its payload is also invalid.
    let correct_option: String = sqlx::query_scalar(
        "SELECT correct_option FROM questions WHERE id = ? AND quiz_id = ?",
    )
    .bind(question_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    payload.validate()?;

    let is_correct = payload.selected_option == correct_option;

    sqlx::query(
        r#"
        INSERT INTO answers (user_id, question_id, selected_option, is_correct, answered_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, question_id) DO UPDATE SET
            selected_option = excluded.selected_option,
            is_correct = excluded.is_correct,
            answered_at = excluded.answered_at
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(&payload.selected_option)
    .bind(is_correct)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert answer: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(user_id, quiz_id, question_id, is_correct, "question answered");

    Ok(Json(json!({ "correct": is_correct })))
}

/// Computes the caller's score on one quiz.
///
/// `total` is the quiz's question count; questions the caller never answered
/// still count toward it, so the percentage reflects coverage-adjusted
/// correctness rather than correctness among attempts only.
pub async fn get_quiz_score(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let quiz_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?;
    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = ?")
        .bind(quiz_id)
        .fetch_one(&pool)
        .await?;

    // A quiz without questions scores zero across the board.
    if total == 0 {
        return Ok(Json(QuizScore {
            score: 0,
            total: 0,
            percentage: 0.0,
        }));
    }

    let score: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM answers a
        JOIN questions q ON a.question_id = q.id
        WHERE a.user_id = ? AND q.quiz_id = ? AND a.is_correct = 1
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(&pool)
    .await?;

    let percentage = round2(score as f64 / total as f64 * 100.0);

    Ok(Json(QuizScore {
        score,
        total,
        percentage,
    }))
}
