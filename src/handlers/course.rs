// src/handlers/course.rs

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
    models::course::{Course, CreateCourseRequest, Section, UpdateLearnRequest},
    utils::html::clean_html,
};

/// Fetches one course or 404s. Shared with the quiz handlers.
pub async fn fetch_course(pool: &PgPool, course_id: i64) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

/// Creates a course with its sections. Admin only.
///
/// Section ids are generated here; embedded quizzes are validated (option
/// counts, correct-index bounds) before anything is written.
pub async fn create_course(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let sections: Vec<Section> = payload
        .sections
        .into_iter()
        .map(|s| s.into_section())
        .collect();

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (title, description, rating, lecturer, img, category, what_you_will_learn, sections)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&payload.title)
    .bind(clean_html(&payload.description))
    .bind(payload.rating)
    .bind(&payload.lecturer)
    .bind(&payload.img)
    .bind(&payload.category)
    .bind(&payload.what_you_will_learn)
    .bind(sqlx::types::Json(&sections))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Course Title already exists".to_string())
        } else {
            tracing::error!("Failed to create course: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Course added successfully", "course": course })),
    ))
}

/// Lists the full catalog. Course documents are returned as stored, quizzes
/// included; the learner-facing quiz endpoint is the answer-hiding surface.
pub async fn list_courses(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id DESC")
        .fetch_all(&pool)
        .await?;

    Ok(Json(courses))
}

/// Retrieves a single course by ID.
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, id).await?;
    Ok(Json(course))
}

/// Deletes a course by ID. Admin only. Enrollments cascade with the row.
pub async fn delete_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(Json(json!({ "message": "Course deleted successfully!" })))
}

/// Updates the learning-outcomes blurb. Admin only.
pub async fn update_learn(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLearnRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "UPDATE courses SET what_you_will_learn = $1 WHERE id = $2 RETURNING *",
    )
    .bind(clean_html(&payload.what_you_will_learn))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(json!({ "message": "Updated successfully", "course": course })))
}
