// src/handlers/blog.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::blog::{Blog, CreateBlogRequest},
    utils::html::clean_html,
};

/// Publishes a blog post. Admin only. Duplicate titles are a 409.
pub async fn create_blog(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let blog = sqlx::query_as::<_, Blog>(
        "INSERT INTO blogs (title, description, img) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&payload.title)
    .bind(clean_html(&payload.description))
    .bind(&payload.img)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Blog Title already exists".to_string())
        } else {
            tracing::error!("Failed to create blog: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Blog added successfully", "blog": blog })),
    ))
}

/// Lists all blog posts, newest first.
pub async fn list_blogs(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let blogs = sqlx::query_as::<_, Blog>("SELECT * FROM blogs ORDER BY id DESC")
        .fetch_all(&pool)
        .await?;

    Ok(Json(blogs))
}

/// Deletes a blog post by ID. Admin only.
pub async fn delete_blog(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }

    Ok(Json(json!({ "message": "Blog deleted successfully!" })))
}
