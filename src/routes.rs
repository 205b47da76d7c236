// src/routes.rs

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{answer, auth, metrics, profile, question, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, questions, users, metrics).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/{id}", get(quiz::get_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/", post(quiz::create_quiz))
                .route("/{id}", put(quiz::update_quiz).delete(quiz::delete_quiz))
                .route("/{id}/questions", post(question::add_question))
                .route("/{id}/score", get(answer::get_quiz_score))
                .route(
                    "/{quiz_id}/questions/{question_id}/answer",
                    post(answer::submit_answer),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let question_routes = Router::new()
        .route(
            "/{id}",
            put(question::update_question).delete(question::delete_question),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/stats", get(profile::get_user_stats))
        .route("/answers", get(profile::list_my_answers))
        .route("/change-password", post(profile::change_password))
        .route("/{id}", get(profile::get_user_details))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/users", user_routes)
        .route("/api/metrics", get(metrics::get_metrics))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
