// src/utils/otp.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Six-digit numeric passcode, zero-padding excluded (100000..=999999),
/// matching what the verification emails display.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Expiry timestamp `minutes` from now.
pub fn expiry(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

/// True once the passcode's deadline has passed.
pub fn is_expired(expires_at: DateTime<Utc>) -> bool {
    Utc::now() > expires_at
}
