// src/models/contact.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'contacts' table: messages left through the contact form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub number: String,
    pub message: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for the contact form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 20, message = "Phone number is required."))]
    pub number: String,
    #[validate(length(min = 1, max = 5000, message = "Message is required."))]
    pub message: String,
}
