// tests/api_tests.rs
//
// End-to-end tests against a real Postgres instance. They are `#[ignore]`d so
// the default `cargo test` run stays hermetic; run them with
// `DATABASE_URL=... cargo test -- --ignored`.

use std::net::SocketAddr;
use std::sync::Arc;

use elearn_backend::{config::Config, routes, state::AppState, utils::jwt::sign_jwt, utils::mail::LogMailer};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const TEST_JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Spawns the app on a random port and returns its base URL plus a pool for
/// seeding.
async fn spawn_app() -> (String, PgPool) {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        owner_email: Some("owner@example.com".to_string()),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        mailer: Arc::new(LogMailer),
    };

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (address, pool)
}

fn unique_tag() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}

/// Inserts a verified user directly and signs a token for them.
async fn seed_user(pool: &PgPool) -> (i64, String) {
    let tag = unique_tag();
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (full_name, email, phone, country, password, is_verified)
        VALUES ($1, $2, $3, 'UK', 'not-a-real-hash', TRUE)
        RETURNING id
        "#,
    )
    .bind(format!("Test User {}", tag))
    .bind(format!("u_{}@example.com", tag))
    .bind(format!("+44{}", &uuid::Uuid::new_v4().as_u128().to_string()[..10]))
    .fetch_one(pool)
    .await
    .expect("Failed to seed user");

    let token = sign_jwt(&id.to_string(), "user", TEST_JWT_SECRET, 600).unwrap();
    (id, token)
}

fn admin_token() -> String {
    sign_jwt("owner@example.com", "admin", TEST_JWT_SECRET, 600).unwrap()
}

/// Creates a course through the admin API. The single section carries a
/// three-question quiz with correct indices [1, 0, 2]. Returns
/// (course_id, section_id).
async fn seed_course(client: &reqwest::Client, address: &str) -> (i64, String) {
    let response = client
        .post(format!("{}/api/admin/courses", address))
        .bearer_auth(admin_token())
        .json(&serde_json::json!({
            "title": format!("Course {}", unique_tag()),
            "description": "A course about things",
            "rating": 4.5,
            "lecturer": "Dr. Test",
            "category": "testing",
            "sections": [{
                "title": "Section one",
                "description": "Watch this first",
                "video_url": "https://videos.example.com/1.mp4",
                "quiz": {
                    "title": "Checkpoint",
                    "questions": [
                        { "text": "q1", "options": ["a", "b", "c"], "correct_answer_index": 1 },
                        { "text": "q2", "options": ["a", "b", "c"], "correct_answer_index": 0 },
                        { "text": "q3", "options": ["a", "b", "c"], "correct_answer_index": 2 }
                    ]
                }
            }]
        }))
        .send()
        .await
        .expect("Failed to create course");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let course_id = body["course"]["id"].as_i64().unwrap();
    let section_id = body["course"]["sections"][0]["id"].as_str().unwrap().to_string();
    (course_id, section_id)
}

async fn enroll(client: &reqwest::Client, address: &str, token: &str, course_id: i64) -> u16 {
    client
        .post(format!("{}/api/enroll", address))
        .bearer_auth(token)
        .json(&serde_json::json!({ "course_id": course_id }))
        .send()
        .await
        .expect("Enroll request failed")
        .status()
        .as_u16()
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    course_id: i64,
    section_id: &str,
    answers: &[i64],
) -> reqwest::Response {
    client
        .post(format!(
            "{}/api/courses/{}/sections/{}/quiz/submit",
            address, course_id, section_id
        ))
        .bearer_auth(token)
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .expect("Submit request failed")
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn health_check_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn signup_verify_login_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let tag = unique_tag();
    let email = format!("flow_{}@example.com", tag);

    // Sign up; the account starts unverified with a pending passcode.
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "full_name": "Flow Tester",
            "email": email,
            "phone": format!("+44{}", &uuid::Uuid::new_v4().as_u128().to_string()[..10]),
            "country": "UK",
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Login is refused until the passcode is confirmed.
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "correct-horse-battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Fish the passcode out of the database, as the email would show it.
    let otp = sqlx::query_scalar::<_, Option<String>>("SELECT otp FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap()
        .expect("signup should store a pending OTP");

    let response = client
        .post(format!("{}/api/auth/verify-otp", address))
        .json(&serde_json::json!({ "email": email, "otp": otp }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].is_string());

    // A wrong passcode after verification is rejected (it was cleared).
    let response = client
        .post(format!("{}/api/auth/verify-otp", address))
        .json(&serde_json::json!({ "email": email, "otp": "000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Login now succeeds.
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "correct-horse-battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn enroll_creates_both_views_and_rejects_duplicates() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = seed_user(&pool).await;
    let (course_id, _section_id) = seed_course(&client, &address).await;

    assert_eq!(enroll(&client, &address, &token, course_id).await, 200);

    // User-side view: the course appears with score 0 and 3 attempts.
    let enrollments: Vec<serde_json::Value> = client
        .get(format!("{}/api/enroll/enrollments", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = enrollments
        .iter()
        .find(|e| e["course_id"].as_i64() == Some(course_id))
        .expect("enrolled course missing from user view");
    assert_eq!(entry["score"], 0);
    assert_eq!(entry["attempts_left"], 3);

    // Course-side view agrees.
    let roster: Vec<serde_json::Value> = client
        .get(format!("{}/api/admin/courses/{}/enrollments", address, course_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = roster
        .iter()
        .find(|e| e["user_id"].as_i64() == Some(user_id))
        .expect("user missing from roster");
    assert_eq!(entry["score"], 0);
    assert_eq!(entry["attempts_left"], 3);
    assert!(entry["user_email"].as_str().unwrap().contains("@example.com"));

    // Enrolling twice is a conflict and changes nothing.
    assert_eq!(enroll(&client, &address, &token, course_id).await, 409);

    // Unknown course is a 404.
    assert_eq!(enroll(&client, &address, &token, 999_999_999).await, 404);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn quiz_scoring_ratchets_and_spends_attempts() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_user_id, token) = seed_user(&pool).await;
    let (course_id, section_id) = seed_course(&client, &address).await;
    assert_eq!(enroll(&client, &address, &token, course_id).await, 200);

    // Two of three correct.
    let response = submit(&client, &address, &token, course_id, &section_id, &[1, 0, 1]).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"], 2);
    assert_eq!(body["best_score"], 2);
    assert_eq!(body["attempts_left"], 2);

    // Perfect score: best ratchets up.
    let response = submit(&client, &address, &token, course_id, &section_id, &[1, 0, 2]).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"], 3);
    assert_eq!(body["best_score"], 3);
    assert_eq!(body["attempts_left"], 1);

    // Worse score: attempt is still spent but the best never drops.
    let response = submit(&client, &address, &token, course_id, &section_id, &[0, 1, 0]).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"], 0);
    assert_eq!(body["best_score"], 3);
    assert_eq!(body["attempts_left"], 0);

    // Allowance exhausted: refused, state untouched.
    let response = submit(&client, &address, &token, course_id, &section_id, &[1, 0, 2]).await;
    assert_eq!(response.status().as_u16(), 403);

    let roster: Vec<serde_json::Value> = client
        .get(format!("{}/api/admin/courses/{}/enrollments", address, course_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roster[0]["score"], 3);
    assert_eq!(roster[0]["attempts_left"], 0);

    // Unenroll + re-enroll resets score and attempts.
    let response = client
        .post(format!("{}/api/enroll/unenroll", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "course_id": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(enroll(&client, &address, &token, course_id).await, 200);
    let response = submit(&client, &address, &token, course_id, &section_id, &[1, 0, 1]).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["best_score"], 2);
    assert_eq!(body["attempts_left"], 2);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn quiz_submission_preconditions() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_user_id, token) = seed_user(&pool).await;
    let (course_id, section_id) = seed_course(&client, &address).await;

    // Not enrolled: forbidden.
    let response = submit(&client, &address, &token, course_id, &section_id, &[1, 0, 2]).await;
    assert_eq!(response.status().as_u16(), 403);

    // Unknown section: not found.
    let response = submit(&client, &address, &token, course_id, "nope", &[1]).await;
    assert_eq!(response.status().as_u16(), 404);

    // Unknown course: not found.
    let response = submit(&client, &address, &token, 999_999_999, &section_id, &[1]).await;
    assert_eq!(response.status().as_u16(), 404);

    // Unenrolling without being enrolled is a 400.
    let response = client
        .post(format!("{}/api/enroll/unenroll", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "course_id": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn quiz_replace_and_learner_view() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_user_id, token) = seed_user(&pool).await;
    let (course_id, section_id) = seed_course(&client, &address).await;

    // Learners see the quiz without correct indices.
    let response = client
        .get(format!(
            "{}/api/courses/{}/sections/{}/quiz",
            address, course_id, section_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);
    assert!(body["questions"][0].get("correct_answer_index").is_none());

    // Replacement is wholesale: the old three questions are gone.
    let response = client
        .post(format!(
            "{}/api/admin/courses/{}/sections/{}/quiz",
            address, course_id, section_id
        ))
        .bearer_auth(admin_token())
        .json(&serde_json::json!({
            "title": "Rewritten",
            "questions": [
                { "text": "only one", "options": ["x", "y"], "correct_answer_index": 0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = client
        .get(format!(
            "{}/api/courses/{}/sections/{}/quiz",
            address, course_id, section_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["title"], "Rewritten");
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);

    // A quiz with an out-of-range correct index is rejected.
    let response = client
        .post(format!(
            "{}/api/admin/courses/{}/sections/{}/quiz",
            address, course_id, section_id
        ))
        .bearer_auth(admin_token())
        .json(&serde_json::json!({
            "title": "Broken",
            "questions": [
                { "text": "bad", "options": ["x", "y"], "correct_answer_index": 2 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn admin_routes_are_guarded() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_user_id, token) = seed_user(&pool).await;

    // No token: 401.
    let response = client
        .get(format!("{}/api/admin/users", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // User token: 403.
    let response = client
        .get(format!("{}/api/admin/users", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Admin token: 200.
    let response = client
        .get(format!("{}/api/admin/users", address))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn admin_passcode_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Only the owner address may request an admin passcode.
    let response = client
        .post(format!("{}/api/admin/auth/send-otp", address))
        .json(&serde_json::json!({ "email": "mallory@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = client
        .post(format!("{}/api/admin/auth/send-otp", address))
        .json(&serde_json::json!({ "email": "owner@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let otp = sqlx::query_scalar::<_, String>(
        "SELECT otp FROM admin_otps WHERE email = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind("owner@example.com")
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = client
        .post(format!("{}/api/admin/auth/verify-otp", address))
        .json(&serde_json::json!({ "email": "owner@example.com", "otp": otp }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    // The minted token reaches admin surface; the passcode is single-use.
    let response = client
        .get(format!("{}/api/admin/users", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/admin/auth/verify-otp", address))
        .json(&serde_json::json!({ "email": "owner@example.com", "otp": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
