// src/handlers/contact.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::contact::{Contact, CreateContactRequest},
    utils::{html::clean_html, mail::Mailer},
};

/// Stores a contact-form message and notifies the site owner.
pub async fn create_contact(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(mailer): State<Arc<dyn Mailer>>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let message = clean_html(&payload.message);

    sqlx::query("INSERT INTO contacts (name, email, number, message) VALUES ($1, $2, $3, $4)")
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.number)
        .bind(&message)
        .execute(&pool)
        .await?;

    if let Some(owner) = &config.owner_email {
        let body = format!(
            "You have a new message:\n\nFrom: {}\nPhone: {}\nMessage: {}",
            payload.email, payload.number, message
        );
        mailer
            .send(
                owner,
                &format!("A contact message was sent by {}", payload.name),
                &body,
            )
            .await?;
    }

    Ok(Json(json!({
        "message": "Your message has been received and saved. Thank you!"
    })))
}

/// Lists all contact messages. Admin only.
pub async fn list_contacts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let contacts = sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY id DESC")
        .fetch_all(&pool)
        .await?;

    Ok(Json(contacts))
}
