// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{LoginRequest, ResetPasswordRequest, SendOtpRequest, SignupRequest, User, VerifyOtpRequest},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
        mail::{Mailer, otp_body},
        otp::{expiry, generate_otp, is_expired},
    },
};

const SIGNUP_OTP_MINUTES: i64 = 5;
const RESEND_OTP_MINUTES: i64 = 10;

async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Creates an account in unverified state and emails a one-time passcode.
///
/// Duplicate email or phone is a 409; the password is Argon2-hashed before
/// it is stored.
pub async fn signup(
    State(pool): State<PgPool>,
    State(mailer): State<Arc<dyn Mailer>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let phone_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE phone = $1")
        .bind(&payload.phone)
        .fetch_optional(&pool)
        .await?;
    if phone_taken.is_some() {
        return Err(AppError::Conflict("Phone number already exists".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let otp = generate_otp();
    let otp_expires_at = expiry(SIGNUP_OTP_MINUTES);

    sqlx::query(
        r#"
        INSERT INTO users (full_name, email, phone, country, password, otp, otp_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&payload.full_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.country)
    .bind(&hashed_password)
    .bind(&otp)
    .bind(otp_expires_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already exists".to_string())
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        }
    })?;

    mailer
        .send(
            &payload.email,
            "Your OTP Code",
            &otp_body(&otp, SIGNUP_OTP_MINUTES),
        )
        .await?;

    Ok(Json(json!({ "message": "OTP sent to email" })))
}

/// Confirms the signup passcode, marks the account verified and returns a JWT.
pub async fn verify_otp(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = find_user_by_email(&pool, &payload.email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if user.otp.as_deref() != Some(payload.otp.as_str()) {
        return Err(AppError::BadRequest("Invalid OTP".to_string()));
    }
    match user.otp_expires_at {
        Some(deadline) if !is_expired(deadline) => {}
        _ => return Err(AppError::BadRequest("OTP has expired".to_string())),
    }

    sqlx::query(
        "UPDATE users SET is_verified = TRUE, otp = NULL, otp_expires_at = NULL WHERE id = $1",
    )
    .bind(user.id)
    .execute(&pool)
    .await?;

    let token = sign_jwt(
        &user.id.to_string(),
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({ "message": "OTP verified", "token": token })))
}

/// Re-issues a passcode for an existing account (verification or password
/// reset flows).
pub async fn send_otp(
    State(pool): State<PgPool>,
    State(mailer): State<Arc<dyn Mailer>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = find_user_by_email(&pool, &payload.email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let otp = generate_otp();
    let otp_expires_at = expiry(RESEND_OTP_MINUTES);

    sqlx::query("UPDATE users SET otp = $1, otp_expires_at = $2 WHERE id = $3")
        .bind(&otp)
        .bind(otp_expires_at)
        .bind(user.id)
        .execute(&pool)
        .await?;

    mailer
        .send(&user.email, "Your OTP Code", &otp_body(&otp, RESEND_OTP_MINUTES))
        .await?;

    Ok(Json(json!({ "message": "OTP sent successfully." })))
}

/// Authenticates a verified user and returns a JWT token.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = find_user_by_email(&pool, &payload.email)
        .await?
        .ok_or(AppError::AuthError("Email is not registered".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;
    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    if !user.is_verified {
        return Err(AppError::Forbidden(
            "Account not verified. Request a new OTP to verify".to_string(),
        ));
    }

    let token = sign_jwt(
        &user.id.to_string(),
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "message": "Sign in successful",
        "token": token,
        "type": "Bearer",
        "user": {
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name,
        }
    })))
}

/// Replaces the stored password hash for the account.
pub async fn reset_password(
    State(pool): State<PgPool>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = find_user_by_email(&pool, &payload.email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let hashed_password = hash_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(&hashed_password)
        .bind(user.id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Password reset successfully" })))
}
