use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::quiz::error::QuizError;
use crate::quiz::types::{Difficulty, Question};

pub const MIN_OPTIONS: usize = 2;

/// Validated, read-only question sequence. Clones share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::invalid_argument("question bank is empty"));
        }
        for (position, question) in questions.iter().enumerate() {
            if question.options.len() < MIN_OPTIONS {
                return Err(QuizError::invalid_argument(format!(
                    "question {} (position {position}) has {} options, need at least {MIN_OPTIONS}",
                    question.id,
                    question.options.len()
                )));
            }
            if question.correct_index >= question.options.len() {
                return Err(QuizError::invalid_argument(format!(
                    "question {} (position {position}) has correctIndex {} but only {} options",
                    question.id,
                    question.correct_index,
                    question.options.len()
                )));
            }
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Ok(Self::new(questions)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let bank = Self::from_json(&raw)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            questions = bank.len(),
            "question bank loaded"
        );
        Ok(bank)
    }
}

impl Deref for QuestionBank {
    type Target = [Question];

    fn deref(&self) -> &Self::Target {
        &self.questions
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: builtin_questions().into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] QuizError),
}

/// Quadratic-equation questions shown by the student quiz screen.
pub fn builtin_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            prompt: "What is the discriminant of the quadratic equation x² - 4x + 4 = 0?".to_string(),
            options: vec!["0".into(), "16".into(), "8".into(), "-16".into()],
            correct_index: 0,
            base_difficulty: Difficulty::Medium,
            explanation: "The discriminant is b² - 4ac = (-4)² - 4(1)(4) = 16 - 16 = 0".to_string(),
        },
        Question {
            id: 2,
            prompt: "How many real solutions does x² + 2x + 5 = 0 have?".to_string(),
            options: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            correct_index: 0,
            base_difficulty: Difficulty::Medium,
            explanation: "The discriminant is 4 - 20 = -16 < 0, so there are no real solutions"
                .to_string(),
        },
        Question {
            id: 3,
            prompt: "What is the vertex of the parabola y = (x - 2)² + 3?".to_string(),
            options: vec![
                "(2, 3)".into(),
                "(-2, 3)".into(),
                "(2, -3)".into(),
                "(-2, -3)".into(),
            ],
            correct_index: 0,
            base_difficulty: Difficulty::Easy,
            explanation: "In vertex form y = (x - h)² + k, the vertex is (h, k) = (2, 3)".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: usize, correct_index: usize) -> Question {
        Question {
            id: 1,
            prompt: "p".into(),
            options: (0..options).map(|i| i.to_string()).collect(),
            correct_index,
            base_difficulty: Difficulty::Easy,
            explanation: "e".into(),
        }
    }

    #[test]
    fn test_builtin_bank_is_valid() {
        let bank = QuestionBank::new(builtin_questions()).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank, QuestionBank::default());
        assert!(bank.iter().all(|q| q.correct_index == 0));
    }

    #[test]
    fn test_empty_bank_rejected() {
        let err = QuestionBank::new(vec![]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_correct_index_out_of_range_rejected() {
        let err = QuestionBank::new(vec![question(4, 4)]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_single_option_rejected() {
        let err = QuestionBank::new(vec![question(1, 0)]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        assert!(matches!(QuestionBank::from_json("{"), Err(BankError::Parse(_))));
        assert!(matches!(QuestionBank::from_json("[]"), Err(BankError::Invalid(_))));
    }
}
