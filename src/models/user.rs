// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Unique email address, stored case-sensitively.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO returned for the self-details endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub full_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            full_name,
            created_at: user.created_at,
        }
    }
}

/// Aggregated statistics for the current user.
#[derive(Debug, Serialize)]
pub struct UserStats {
    pub quizzes_created: i64,
    pub questions_created: i64,
    /// Distinct quizzes in which the user has answered at least one question.
    pub quizzes_taken: i64,
    pub total_answers: i64,
    /// Correct share of all answers ever given, rounded to 2 decimals.
    /// 0 when the user has not answered anything.
    pub average_score_percentage: f64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required."))]
    pub last_name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for changing the current user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub current_password: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "New password must be at least 6 characters long."
    ))]
    pub new_password: String,
}
