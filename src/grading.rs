// src/grading.rs

use crate::models::course::Question;

/// Scores a submission against a quiz's questions.
///
/// `answers` holds selected option indices, positionally aligned with
/// `questions`. One point per exact match with the question's correct index.
/// Missing entries (shorter answer list) and out-of-range selections simply
/// don't match; nothing here can fail. The result is always within
/// `0..=questions.len()`.
pub fn grade(questions: &[Question], answers: &[i64]) -> i64 {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i) == Some(&(q.correct_answer_index as i64)))
        .count() as i64
}
