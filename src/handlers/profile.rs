// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        answer::AnswerRecord,
        user::{ChangePasswordRequest, User, UserResponse, UserStats},
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::Claims,
        score::round2,
    },
};

/// Returns one user's details. Users can only access their own.
pub async fn get_user_details(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id()? != user_id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, email, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Changes the current user's password after verifying the old one.
pub async fn change_password(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let password_hash: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.current_password, &password_hash)? {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    if payload.current_password == payload.new_password {
        return Err(AppError::BadRequest(
            "New password must be different from current password".to_string(),
        ));
    }

    let new_hash = hash_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(user_id)
        .execute(&pool)
        .await?;

    tracing::info!(user_id, "password changed");

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// Aggregated statistics for the current user.
///
/// The average is computed over all of the user's answers across every quiz,
/// not per quiz, and is 0 when the user has not answered anything.
pub async fn get_user_stats(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let quizzes_created: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE creator_id = ?")
            .bind(user_id)
            .fetch_one(&pool)
            .await?;

    let questions_created: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM questions q
        JOIN quizzes z ON q.quiz_id = z.id
        WHERE z.creator_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let quizzes_taken: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT q.quiz_id)
        FROM answers a
        JOIN questions q ON a.question_id = q.id
        WHERE a.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let total_answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;

    let correct_answers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE user_id = ? AND is_correct = 1")
            .bind(user_id)
            .fetch_one(&pool)
            .await?;

    let average_score_percentage = if total_answers > 0 {
        round2(correct_answers as f64 / total_answers as f64 * 100.0)
    } else {
        0.0
    };

    Ok(Json(UserStats {
        quizzes_created,
        questions_created,
        quizzes_taken,
        total_answers,
        average_score_percentage,
    }))
}

/// Lists the current user's answer history with the owning quiz of each
/// answered question.
pub async fn list_my_answers(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let answers = sqlx::query_as::<_, AnswerRecord>(
        r#"
        SELECT a.id, a.question_id, q.quiz_id, a.selected_option, a.is_correct, a.answered_at
        FROM answers a
        JOIN questions q ON a.question_id = q.id
        WHERE a.user_id = ?
        ORDER BY a.answered_at DESC, a.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "user_id": user_id,
        "total_answers": answers.len(),
        "answers": answers
    })))
}
