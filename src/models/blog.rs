// src/models/blog.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'blogs' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    /// Unique blog title.
    pub title: String,
    pub description: String,
    pub img: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for publishing a blog post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, max = 20000, message = "Description is required."))]
    pub description: String,
    #[validate(length(min = 1, message = "Image is required."))]
    pub img: String,
}
