// src/handlers/user.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, models::user::UserListEntry};

/// Lists all accounts with their enrollment counts. Admin only. Password
/// hashes and pending passcodes never leave the database here.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, UserListEntry>(
        r#"
        SELECT u.id, u.full_name, u.email, u.phone, u.country, u.is_verified,
               COUNT(e.id) AS enrolled_count, u.created_at
        FROM users u
        LEFT JOIN enrollments e ON e.user_id = u.id
        GROUP BY u.id
        ORDER BY u.id DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(users))
}
