// src/models/metrics.rs

use serde::Serialize;

/// System-wide counters served by the public metrics endpoint.
#[derive(Debug, Serialize)]
pub struct GlobalMetrics {
    pub total_users: i64,
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub total_answers: i64,
    /// Mean over all answers of (100 if correct else 0), rounded to 2
    /// decimals; 0 when no answers exist yet.
    pub average_score_percentage: f64,
}
