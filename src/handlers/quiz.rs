// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    grading::grade,
    handlers::course::fetch_course,
    models::{
        course::{Course, QuizPayload, QuizView, Section},
        enrollment::{SubmitQuizRequest, SubmitQuizResponse},
    },
    utils::jwt::Claims,
};

fn find_section<'a>(course: &'a Course, section_id: &str) -> Result<&'a Section, AppError> {
    course
        .sections
        .iter()
        .find(|s| s.id == section_id)
        .ok_or(AppError::NotFound("Section not found".to_string()))
}

/// Attaches a quiz to a section, replacing any existing one wholesale.
/// Admin only. Question shape (>= 2 options, in-range correct index) is
/// validated before the write.
pub async fn replace_quiz(
    State(pool): State<PgPool>,
    Path((course_id, section_id)): Path<(i64, String)>,
    Json(payload): Json<QuizPayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let course = fetch_course(&pool, course_id).await?;
    find_section(&course, &section_id)?;

    let mut sections = course.sections.0;
    for section in sections.iter_mut() {
        if section.id == section_id {
            section.quiz = Some(payload.into_quiz());
            break;
        }
    }

    sqlx::query("UPDATE courses SET sections = $1 WHERE id = $2")
        .bind(sqlx::types::Json(&sections))
        .bind(course_id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Quiz added successfully!" })))
}

/// Returns a section's quiz with the correct answers stripped.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path((course_id, section_id)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;
    let section = find_section(&course, &section_id)?;

    let quiz = section
        .quiz
        .as_ref()
        .ok_or(AppError::NotFound("Section has no quiz".to_string()))?;

    Ok(Json(QuizView::from(quiz)))
}

/// Grades a quiz submission and records the result on the caller's
/// enrollment.
///
/// The stored score only moves upward (`GREATEST`), and the attempt is spent
/// in the same guarded statement that checks `attempts_left > 0`, so two
/// racing submissions can never double-spend an attempt or regress the best
/// score. A submission that fails any precondition leaves the enrollment
/// untouched.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((course_id, section_id)): Path<(i64, String)>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let course = fetch_course(&pool, course_id).await?;
    let section = find_section(&course, &section_id)?;
    let quiz = section
        .quiz
        .as_ref()
        .ok_or(AppError::NotFound("Section has no quiz".to_string()))?;

    let score = grade(&quiz.questions, &req.answers);

    let updated = sqlx::query_as::<_, (i64, i64)>(
        r#"
        UPDATE enrollments
        SET score = GREATEST(score, $3), attempts_left = attempts_left - 1
        WHERE user_id = $1 AND course_id = $2 AND attempts_left > 0
        RETURNING score, attempts_left
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(score)
    .fetch_optional(&pool)
    .await?;

    match updated {
        Some((best_score, attempts_left)) => Ok(Json(SubmitQuizResponse {
            score,
            best_score,
            attempts_left,
        })),
        None => {
            let enrolled = sqlx::query_scalar::<_, i64>(
                "SELECT attempts_left FROM enrollments WHERE user_id = $1 AND course_id = $2",
            )
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(&pool)
            .await?;

            match enrolled {
                Some(_) => Err(AppError::Forbidden(
                    "No attempts remaining for this course".to_string(),
                )),
                None => Err(AppError::Forbidden(
                    "You are not enrolled in this course".to_string(),
                )),
            }
        }
    }
}
