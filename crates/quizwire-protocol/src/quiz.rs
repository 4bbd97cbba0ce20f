//! Quiz definition types: the immutable content of one session.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// The number of answer choices on every question.
pub const CHOICE_COUNT: usize = 4;

/// One multiple-choice question.
///
/// `choices` is a fixed-size array so the "exactly four choices" rule is
/// enforced structurally — a payload with three or five choices fails to
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Unique within the quiz.
    pub id: u32,
    pub title: String,
    pub choices: [String; CHOICE_COUNT],
    /// Index of the correct choice (0–3). Never sent to players outside
    /// the results phase.
    pub correct_index: u8,
    /// Answer window length. Must be strictly positive.
    pub duration_ms: u64,
}

/// A full quiz as supplied by the host at room creation.
///
/// Immutable once a room is created from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDefinition {
    /// Checks the structural rules that serde cannot express.
    ///
    /// A quiz with zero questions is valid (the session ends immediately
    /// on start).
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidQuiz`] naming the first violation:
    /// a non-positive duration, an out-of-range correct index, or a
    /// duplicate question id.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let mut seen = HashSet::with_capacity(self.questions.len());
        for q in &self.questions {
            if q.duration_ms == 0 {
                return Err(ProtocolError::InvalidQuiz(format!(
                    "question {} has zero duration",
                    q.id
                )));
            }
            if q.correct_index as usize >= CHOICE_COUNT {
                return Err(ProtocolError::InvalidQuiz(format!(
                    "question {} has correct index {} out of range",
                    q.id, q.correct_index
                )));
            }
            if !seen.insert(q.id) {
                return Err(ProtocolError::InvalidQuiz(format!(
                    "duplicate question id {}",
                    q.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u32) -> QuizQuestion {
        QuizQuestion {
            id,
            title: format!("Question {id}"),
            choices: [
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_index: 0,
            duration_ms: 10_000,
        }
    }

    #[test]
    fn valid_quiz_passes() {
        let quiz = QuizDefinition {
            title: "Capitals".into(),
            questions: vec![question(1), question(2)],
        };
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn empty_quiz_is_valid() {
        let quiz = QuizDefinition {
            title: "Empty".into(),
            questions: vec![],
        };
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn zero_duration_rejected() {
        let mut q = question(1);
        q.duration_ms = 0;
        let quiz = QuizDefinition {
            title: "Bad".into(),
            questions: vec![q],
        };
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn out_of_range_correct_index_rejected() {
        let mut q = question(1);
        q.correct_index = 4;
        let quiz = QuizDefinition {
            title: "Bad".into(),
            questions: vec![q],
        };
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn duplicate_question_id_rejected() {
        let quiz = QuizDefinition {
            title: "Bad".into(),
            questions: vec![question(7), question(7)],
        };
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn question_uses_camel_case_fields() {
        let json: serde_json::Value = serde_json::to_value(question(1)).unwrap();
        assert_eq!(json["correctIndex"], 0);
        assert_eq!(json["durationMs"], 10_000);
        assert_eq!(json["choices"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn wrong_choice_count_fails_to_deserialize() {
        let json = r#"{
            "id": 1, "title": "Q", "choices": ["A", "B", "C"],
            "correctIndex": 0, "durationMs": 5000
        }"#;
        let result: Result<QuizQuestion, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
