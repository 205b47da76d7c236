// tests/scoring_tests.rs
//
// Exercises the answer upsert, quiz scoring, user statistics and global
// metrics endpoints.

use chrono::{DateTime, Utc};
use quizhub::{config::Config, db, routes, state::AppState};

struct TestApp {
    address: String,
    pool: sqlx::SqlitePool,
}

/// Helper to spawn the app on a random port against a fresh SQLite database.
async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("quizhub_test_{}.db", uuid::Uuid::new_v4()));
    let database_url = format!("sqlite://{}", db_path.display());

    let pool = db::connect_pool(&database_url)
        .await
        .expect("Failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, pool }
}

async fn register_and_login(client: &reqwest::Client, address: &str) -> (String, i64) {
    let email = format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);

    let resp = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    (
        login["token"].as_str().expect("Token not found").to_string(),
        login["user_id"].as_i64().expect("user_id not found"),
    )
}

async fn create_quiz(client: &reqwest::Client, address: &str, token: &str, title: &str) -> i64 {
    let resp = client
        .post(format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "title": title }))
        .send()
        .await
        .expect("Create quiz failed");
    assert_eq!(resp.status().as_u16(), 201);

    let quiz: serde_json::Value = resp.json().await.unwrap();
    quiz["id"].as_i64().unwrap()
}

async fn add_question(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    quiz_id: i64,
    correct_option: &str,
) -> i64 {
    let resp = client
        .post(format!("{}/api/quizzes/{}/questions", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "text": "What is the answer?",
            "option_a": "first",
            "option_b": "second",
            "option_c": "third",
            "option_d": "fourth",
            "correct_option": correct_option
        }))
        .send()
        .await
        .expect("Add question failed");
    assert_eq!(resp.status().as_u16(), 201);

    let question: serde_json::Value = resp.json().await.unwrap();
    question["id"].as_i64().unwrap()
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    quiz_id: i64,
    question_id: i64,
    option: &str,
) -> reqwest::Response {
    client
        .post(format!(
            "{}/api/quizzes/{}/questions/{}/answer",
            address, quiz_id, question_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "selected_option": option }))
        .send()
        .await
        .expect("Submit failed")
}

#[tokio::test]
async fn submit_answer_requires_auth() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quizzes/1/questions/1/answer", app.address))
        .json(&serde_json::json!({ "selected_option": "A" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn mismatched_quiz_and_question_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;

    let quiz_a = create_quiz(&client, &app.address, &token, "Quiz A").await;
    let quiz_b = create_quiz(&client, &app.address, &token, "Quiz B").await;
    let question_b = add_question(&client, &app.address, &token, quiz_b, "A").await;

    // Question exists, but belongs to the other quiz.
    let response = submit(&client, &app.address, &token, quiz_a, question_b, "A").await;
    assert_eq!(response.status().as_u16(), 404);

    // Entirely unknown question.
    let response = submit(&client, &app.address, &token, quiz_a, 9999, "A").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_question_outranks_invalid_option() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;

    // Nothing exists at (quiz 1, question 999) and the option is bad too;
    // resolution happens first, so the caller sees 404, not 400.
    let response = submit(&client, &app.address, &token, 1, 999, "E").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_option_is_rejected_before_persistence() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;
    let quiz_id = create_quiz(&client, &app.address, &token, "Validation").await;
    let question_id = add_question(&client, &app.address, &token, quiz_id, "A").await;

    let response = submit(&client, &app.address, &token, quiz_id, question_id, "E").await;
    assert_eq!(response.status().as_u16(), 400);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn resubmission_overwrites_a_single_row() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, taker_id) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Upsert").await;
    let question_id = add_question(&client, &app.address, &creator_token, quiz_id, "B").await;

    let first: serde_json::Value = submit(&client, &app.address, &taker_token, quiz_id, question_id, "A")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first["correct"], false);

    let first_at: DateTime<Utc> =
        sqlx::query_scalar("SELECT answered_at FROM answers WHERE user_id = ? AND question_id = ?")
            .bind(taker_id)
            .bind(question_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let second: serde_json::Value = submit(&client, &app.address, &taker_token, quiz_id, question_id, "B")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["correct"], true);

    // Still exactly one row, reflecting only the latest submission.
    let rows: Vec<(String, bool, DateTime<Utc>)> = sqlx::query_as(
        "SELECT selected_option, is_correct, answered_at FROM answers WHERE user_id = ? AND question_id = ?",
    )
    .bind(taker_id)
    .bind(question_id)
    .fetch_all(&app.pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    let (selected, is_correct, second_at) = &rows[0];
    assert_eq!(selected, "B");
    assert!(*is_correct);
    assert!(*second_at > first_at, "answered_at must move forward");
}

#[tokio::test]
async fn wrong_then_right_scores_full_marks() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "One question").await;
    let question_id = add_question(&client, &app.address, &creator_token, quiz_id, "B").await;

    let first: serde_json::Value = submit(&client, &app.address, &taker_token, quiz_id, question_id, "A")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first["correct"], false);

    let second: serde_json::Value = submit(&client, &app.address, &taker_token, quiz_id, question_id, "B")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["correct"], true);

    let score: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}/score", app.address, quiz_id))
        .header("Authorization", format!("Bearer {}", taker_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(score["score"].as_i64().unwrap(), 1);
    assert_eq!(score["total"].as_i64().unwrap(), 1);
    assert!((score["percentage"].as_f64().unwrap() - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn empty_quiz_scores_zero_without_dividing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;
    let quiz_id = create_quiz(&client, &app.address, &token, "Empty").await;

    let score: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}/score", app.address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(score["score"].as_i64().unwrap(), 0);
    assert_eq!(score["total"].as_i64().unwrap(), 0);
    assert_eq!(score["percentage"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn score_for_unknown_quiz_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;

    let response = client
        .get(format!("{}/api/quizzes/9999/score", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unanswered_questions_count_toward_total_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Coverage").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    let q2 = add_question(&client, &app.address, &creator_token, quiz_id, "B").await;
    add_question(&client, &app.address, &creator_token, quiz_id, "C").await;

    // Answer two of three questions, one correctly; leave the third alone.
    submit(&client, &app.address, &taker_token, quiz_id, q1, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q2, "D").await;

    let score: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}/score", app.address, quiz_id))
        .header("Authorization", format!("Bearer {}", taker_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(score["score"].as_i64().unwrap(), 1);
    assert_eq!(score["total"].as_i64().unwrap(), 3);
    assert!((score["percentage"].as_f64().unwrap() - 33.33).abs() < 1e-9);
}

#[tokio::test]
async fn user_stats_with_no_answers_average_is_zero() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&client, &app.address).await;

    let stats: serde_json::Value = client
        .get(format!("{}/api/users/stats", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["total_answers"].as_i64().unwrap(), 0);
    assert_eq!(stats["quizzes_taken"].as_i64().unwrap(), 0);
    assert_eq!(stats["average_score_percentage"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn user_stats_reflect_created_and_taken_quizzes() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Stats").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    let q2 = add_question(&client, &app.address, &creator_token, quiz_id, "B").await;

    submit(&client, &app.address, &taker_token, quiz_id, q1, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q2, "C").await;

    let creator_stats: serde_json::Value = client
        .get(format!("{}/api/users/stats", app.address))
        .header("Authorization", format!("Bearer {}", creator_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(creator_stats["quizzes_created"].as_i64().unwrap(), 1);
    assert_eq!(creator_stats["questions_created"].as_i64().unwrap(), 2);
    assert_eq!(creator_stats["quizzes_taken"].as_i64().unwrap(), 0);

    let taker_stats: serde_json::Value = client
        .get(format!("{}/api/users/stats", app.address))
        .header("Authorization", format!("Bearer {}", taker_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(taker_stats["quizzes_created"].as_i64().unwrap(), 0);
    assert_eq!(taker_stats["quizzes_taken"].as_i64().unwrap(), 1);
    assert_eq!(taker_stats["total_answers"].as_i64().unwrap(), 2);
    assert!((taker_stats["average_score_percentage"].as_f64().unwrap() - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn answer_history_lists_the_callers_answers() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, taker_id) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "History").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q1, "B").await;

    let history: serde_json::Value = client
        .get(format!("{}/api/users/answers", app.address))
        .header("Authorization", format!("Bearer {}", taker_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(history["user_id"].as_i64().unwrap(), taker_id);
    assert_eq!(history["total_answers"].as_i64().unwrap(), 1);
    let answers = history["answers"].as_array().unwrap();
    assert_eq!(answers[0]["quiz_id"].as_i64().unwrap(), quiz_id);
    assert_eq!(answers[0]["selected_option"], "B");
    assert_eq!(answers[0]["is_correct"], false);
}

#[tokio::test]
async fn global_metrics_average_over_all_answers() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Metrics").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    let q2 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    let q3 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;

    // 5 answers total, 3 of them correct.
    submit(&client, &app.address, &creator_token, quiz_id, q1, "A").await;
    submit(&client, &app.address, &creator_token, quiz_id, q2, "A").await;
    submit(&client, &app.address, &creator_token, quiz_id, q3, "B").await;
    submit(&client, &app.address, &taker_token, quiz_id, q1, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q2, "C").await;

    let metrics: serde_json::Value = client
        .get(format!("{}/api/metrics", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(metrics["total_users"].as_i64().unwrap(), 2);
    assert_eq!(metrics["total_quizzes"].as_i64().unwrap(), 1);
    assert_eq!(metrics["total_questions"].as_i64().unwrap(), 3);
    assert_eq!(metrics["total_answers"].as_i64().unwrap(), 5);
    assert!((metrics["average_score_percentage"].as_f64().unwrap() - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn global_metrics_on_empty_system() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let metrics: serde_json::Value = client
        .get(format!("{}/api/metrics", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(metrics["total_answers"].as_i64().unwrap(), 0);
    assert_eq!(metrics["average_score_percentage"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn deleting_a_quiz_cascades_questions_and_answers() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Doomed").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q1, "A").await;

    let response = client
        .delete(format!("{}/api/quizzes/{}", app.address, quiz_id))
        .header("Authorization", format!("Bearer {}", creator_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(questions, 0);
    assert_eq!(answers, 0);

    let gone = client
        .get(format!("{}/api/quizzes/{}", app.address, quiz_id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn deleting_a_question_cascades_its_answers() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (creator_token, _) = register_and_login(&client, &app.address).await;
    let (taker_token, _) = register_and_login(&client, &app.address).await;

    let quiz_id = create_quiz(&client, &app.address, &creator_token, "Pruned").await;
    let q1 = add_question(&client, &app.address, &creator_token, quiz_id, "A").await;
    let q2 = add_question(&client, &app.address, &creator_token, quiz_id, "B").await;
    submit(&client, &app.address, &taker_token, quiz_id, q1, "A").await;
    submit(&client, &app.address, &taker_token, quiz_id, q2, "B").await;

    let response = client
        .delete(format!("{}/api/questions/{}", app.address, q1))
        .header("Authorization", format!("Bearer {}", creator_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(answers, 1);
}
