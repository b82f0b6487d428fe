// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::utils::html::clean_html;

/// Represents the 'courses' table. The nested section/quiz document shape
/// lives in the `sections` JSONB column.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    /// Unique course title.
    pub title: String,
    pub description: String,
    pub rating: f64,
    pub lecturer: String,
    pub img: String,
    pub category: String,
    pub what_you_will_learn: Option<String>,
    pub sections: Json<Vec<Section>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One section of a course: a video plus its timeline notes, downloadable
/// resources and (optionally) a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Server-generated UUID, used to address the section in routes.
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(default)]
    pub timeline: Vec<TimelineNote>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineNote {
    pub time: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// At least two options; enforced on every create/replace.
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer_index: usize,
}

/// Quiz as shown to learners: correct indices stripped.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub title: String,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        QuizView {
            title: quiz.title.clone(),
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionView {
                    text: q.text.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

/// DTO for creating a course, sections included.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Description is required."))]
    pub description: String,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5."))]
    pub rating: f64,
    #[serde(default)]
    pub lecturer: String,
    #[serde(default)]
    #[validate(custom(function = validate_optional_url))]
    pub img: String,
    #[serde(default)]
    pub category: String,
    pub what_you_will_learn: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<SectionInput>,
}

/// DTO for one incoming section. The server assigns the id.
#[derive(Debug, Deserialize, Validate)]
pub struct SectionInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = validate_optional_url))]
    pub video_url: String,
    #[serde(default)]
    pub timeline: Vec<TimelineNote>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[validate(nested)]
    pub quiz: Option<QuizPayload>,
}

impl SectionInput {
    /// Materializes the section, generating its id and sanitizing the
    /// free-text description.
    pub fn into_section(self) -> Section {
        Section {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: clean_html(&self.description),
            video_url: self.video_url,
            timeline: self.timeline,
            resources: self.resources,
            quiz: self.quiz.map(QuizPayload::into_quiz),
        }
    }
}

/// DTO for creating or wholesale-replacing a section's quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, message = "A quiz needs at least one question."))]
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

impl QuizPayload {
    pub fn into_quiz(self) -> Quiz {
        Quiz {
            title: self.title,
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    text: q.text,
                    options: q.options,
                    correct_answer_index: q.correct_answer_index,
                })
                .collect(),
        }
    }
}

/// Every question must offer at least two options and point its correct
/// index inside them.
fn validate_questions(questions: &[QuestionPayload]) -> Result<(), validator::ValidationError> {
    for q in questions {
        if q.text.trim().is_empty() {
            return Err(validator::ValidationError::new("question_text_empty"));
        }
        if q.options.len() < 2 {
            return Err(validator::ValidationError::new("too_few_options"));
        }
        if q.correct_answer_index >= q.options.len() {
            return Err(validator::ValidationError::new(
                "correct_answer_index_out_of_range",
            ));
        }
    }
    Ok(())
}

/// Accepts an empty string or a well-formed absolute URL.
fn validate_optional_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    url::Url::parse(value).map_err(|_| validator::ValidationError::new("invalid_url"))?;
    Ok(())
}

/// DTO for updating the learning-outcomes blurb.
#[derive(Debug, Deserialize)]
pub struct UpdateLearnRequest {
    pub what_you_will_learn: String,
}
