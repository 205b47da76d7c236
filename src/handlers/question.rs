// src/handlers/question.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::quiz::authorize_creator,
    models::question::{CreateQuestionRequest, Question, UpdateQuestionRequest},
    utils::jwt::Claims,
};

/// Adds a question to a quiz. Only the quiz's creator may do this.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    // Existence and authorization outrank payload validation.
    authorize_creator(&pool, quiz_id, user_id).await?;
    payload.validate()?;

    let question = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (quiz_id, text, option_a, option_b, option_c, option_d, correct_option)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, quiz_id, text, option_a, option_b, option_c, option_d, correct_option
        "#,
    )
    .bind(quiz_id)
    .bind(&payload.text)
    .bind(&payload.option_a)
    .bind(&payload.option_b)
    .bind(&payload.option_c)
    .bind(&payload.option_d)
    .bind(&payload.correct_option)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Partially updates a question. Only the owning quiz's creator may do this.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    authorize_question_owner(&pool, question_id, user_id).await?;
    payload.validate()?;

    sqlx::query(
        r#"
        UPDATE questions SET
            text = COALESCE(?, text),
            option_a = COALESCE(?, option_a),
            option_b = COALESCE(?, option_b),
            option_c = COALESCE(?, option_c),
            option_d = COALESCE(?, option_d),
            correct_option = COALESCE(?, correct_option)
        WHERE id = ?
        "#,
    )
    .bind(payload.text)
    .bind(payload.option_a)
    .bind(payload.option_b)
    .bind(payload.option_c)
    .bind(payload.option_d)
    .bind(payload.correct_option)
    .bind(question_id)
    .execute(&pool)
    .await?;

    Ok(Json(json!({ "message": "Question updated successfully" })))
}

/// Deletes a question and, by cascade, all answers to it.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    authorize_question_owner(&pool, question_id, user_id).await?;

    sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(question_id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Question deleted successfully" })))
}

/// Resolves a question's owning quiz and checks its creator against the
/// caller. 404 if the question is missing, 403 on a creator mismatch.
async fn authorize_question_owner(
    pool: &SqlitePool,
    question_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let creator_id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT z.creator_id
        FROM questions q
        JOIN quizzes z ON q.quiz_id = z.id
        WHERE q.id = ?
        "#,
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    match creator_id {
        None => Err(AppError::NotFound("Question not found".to_string())),
        Some(creator_id) if creator_id != user_id => {
            Err(AppError::Forbidden("Not authorized".to_string()))
        }
        Some(_) => Ok(()),
    }
}
