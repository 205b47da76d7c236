// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with the new user id.
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            AppError::Conflict("Email already registered".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id, email = %payload.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": user_id
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the email and password against the database.
/// If valid, signs a JWT token carrying the user's ID.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, email, password_hash, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password_hash)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!(user_id = user.id, "user login");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user_id": user.id,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "full_name": user.full_name(),
        "email": user.email
    })))
}
