// src/models/enrollment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Submissions allowed per (user, course): the first attempt plus two retries.
pub const DEFAULT_ATTEMPTS: i64 = 3;

/// Represents the 'enrollments' table: the single record tying a user to a
/// course, carrying the best score and the remaining-attempts counter. The
/// user's course list and the course roster are both projections of this row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    /// Display name/email captured at enroll time.
    pub user_name: String,
    pub user_email: String,
    pub score: i64,
    pub attempts_left: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// User-side view: one enrolled course with the caller's progress.
#[derive(Debug, Serialize, FromRow)]
pub struct EnrolledCourse {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub img: String,
    pub category: String,
    pub score: i64,
    pub attempts_left: i64,
}

/// Course-side view: one learner on the course roster.
#[derive(Debug, Serialize, FromRow)]
pub struct RosterEntry {
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub score: i64,
    pub attempts_left: i64,
}

/// DTO for enroll / unenroll calls.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: i64,
}

/// DTO for submitting quiz answers: selected option indices, positionally
/// aligned with the quiz's questions.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    /// Score of this submission.
    pub score: i64,
    /// Stored best after the ratchet.
    pub best_score: i64,
    pub attempts_left: i64,
}
