// src/handlers/admin.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{SendOtpRequest, VerifyOtpRequest},
    utils::{
        jwt::sign_jwt,
        mail::{Mailer, otp_body},
        otp::{expiry, generate_otp, is_expired},
    },
};

const ADMIN_OTP_MINUTES: i64 = 5;

/// Emails a one-time admin passcode. Only the configured owner address may
/// request one.
pub async fn send_otp(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(mailer): State<Arc<dyn Mailer>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if config.owner_email.as_deref() != Some(payload.email.as_str()) {
        return Err(AppError::Forbidden("Unauthorized email".to_string()));
    }

    let otp = generate_otp();
    let expires_at = expiry(ADMIN_OTP_MINUTES);

    sqlx::query("INSERT INTO admin_otps (email, otp, expires_at) VALUES ($1, $2, $3)")
        .bind(&payload.email)
        .bind(&otp)
        .bind(expires_at)
        .execute(&pool)
        .await?;

    mailer
        .send(&payload.email, "Your Admin OTP", &otp_body(&otp, ADMIN_OTP_MINUTES))
        .await?;

    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

#[derive(sqlx::FromRow)]
struct AdminOtpRow {
    id: i64,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// Confirms an admin passcode and mints an admin-role token. The passcode is
/// single-use: the row is deleted whether it was expired or accepted.
pub async fn verify_otp(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let record = sqlx::query_as::<_, AdminOtpRow>(
        "SELECT id, expires_at FROM admin_otps WHERE email = $1 AND otp = $2 ORDER BY id DESC LIMIT 1",
    )
    .bind(&payload.email)
    .bind(&payload.otp)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::BadRequest("Invalid or expired OTP".to_string()))?;

    sqlx::query("DELETE FROM admin_otps WHERE id = $1")
        .bind(record.id)
        .execute(&pool)
        .await?;

    if is_expired(record.expires_at) {
        return Err(AppError::BadRequest("OTP has expired".to_string()));
    }

    let token = sign_jwt(
        &payload.email,
        "admin",
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "message": "OTP verified successfully",
        "token": token,
        "admin": { "role": "admin" }
    })))
}
