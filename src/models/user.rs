// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Digits with an optional leading '+', 7 to 15 digits (E.164-ish).
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub full_name: String,

    /// Unique email, doubles as the login identifier.
    pub email: String,

    pub phone: String,

    pub country: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// 'user' or 'admin'.
    pub role: String,

    /// Set once the signup passcode has been confirmed.
    pub is_verified: bool,

    /// Pending one-time passcode, if any.
    #[serde(skip)]
    pub otp: Option<String>,
    #[serde(skip)]
    pub otp_expires_at: Option<chrono::DateTime<chrono::Utc>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Row for the admin user listing: account plus how many courses it joined.
#[derive(Debug, Serialize, FromRow)]
pub struct UserListEntry {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub is_verified: bool,
    pub enrolled_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for signing up a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "A valid phone number is required."))]
    pub phone: String,
    #[validate(length(min = 1, max = 60, message = "Country is required."))]
    pub country: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for confirming a one-time passcode (user or admin flow).
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits."))]
    pub otp: String,
}

/// DTO for re-requesting a passcode.
#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}
