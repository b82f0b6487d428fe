// src/handlers/enroll.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::{AppError, is_unique_violation},
    models::enrollment::{DEFAULT_ATTEMPTS, EnrollRequest, EnrolledCourse, RosterEntry},
    utils::jwt::Claims,
};

#[derive(sqlx::FromRow)]
struct UserIdentity {
    full_name: String,
    email: String,
}

/// Enrolls the caller in a course.
///
/// The enrollment row is the single record of the relationship, created with
/// score 0 and the default attempts allowance; the caller's display name and
/// email are captured into it at this moment. The pair-unique index turns a
/// repeat enroll into a 409.
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = sqlx::query_as::<_, UserIdentity>(
        "SELECT full_name, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let course_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;
    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, course_id, user_name, user_email, score, attempts_left)
        VALUES ($1, $2, $3, $4, 0, $5)
        "#,
    )
    .bind(user_id)
    .bind(payload.course_id)
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(DEFAULT_ATTEMPTS)
    .execute(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You are already enrolled in this course".to_string())
        } else {
            tracing::error!("Failed to enroll user {}: {:?}", user_id, e);
            AppError::from(e)
        }
    })?;

    Ok(Json(json!({ "message": "Successfully enrolled in the course" })))
}

/// Removes the caller's enrollment. Deleting the row clears both the user's
/// course list and the course roster in one step; a later re-enroll starts
/// fresh at score 0 with a full attempts allowance.
pub async fn unenroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let course_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;
    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let result = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(payload.course_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "You are not enrolled in this course".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Successfully unenrolled from the course" })))
}

/// Lists the caller's enrolled courses with their progress (user-side view).
pub async fn list_enrollments(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let courses = sqlx::query_as::<_, EnrolledCourse>(
        r#"
        SELECT c.id AS course_id, c.title, c.description, c.img, c.category,
               e.score, e.attempts_left
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.user_id = $1
        ORDER BY e.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Lists everyone enrolled in a course (course-side view). Admin only.
pub async fn course_roster(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?;
    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let roster = sqlx::query_as::<_, RosterEntry>(
        r#"
        SELECT user_id, user_name, user_email, score, attempts_left
        FROM enrollments
        WHERE course_id = $1
        ORDER BY score DESC, user_name
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(roster))
}
