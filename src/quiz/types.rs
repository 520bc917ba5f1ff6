use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quiz::adaptation::ContentLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub base_difficulty: Difficulty,
    pub explanation: String,
}

/// A question as presented to the learner: identical to the bank entry
/// except that `difficulty` is the adapted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl EffectiveQuestion {
    pub fn from_question(question: &Question, difficulty: Difficulty) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            correct_index: question.correct_index,
            difficulty,
            explanation: question.explanation.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizPhase {
    AwaitingAnswer,
    Revealed,
    Complete,
}

impl QuizPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            QuizPhase::AwaitingAnswer => "AWAITING_ANSWER",
            QuizPhase::Revealed => "REVEALED",
            QuizPhase::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerOutcome::Correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub state: QuizPhase,
    pub current_index: usize,
    pub total_questions: usize,
    /// `None` once the quiz is complete.
    pub question: Option<EffectiveQuestion>,
    pub selected_answer: Option<usize>,
    pub revealed: bool,
    pub last_outcome: Option<AnswerOutcome>,
    pub score: u32,
    pub streak: u32,
    pub time_remaining_seconds: u32,
    pub answered_count: u32,
    pub accuracy_percent: u32,
    pub points_earned: u32,
    pub progress_percent: u32,
    pub hint_available: bool,
    pub content_level: ContentLevel,
}

impl QuizSnapshot {
    pub fn is_complete(&self) -> bool {
        self.state == QuizPhase::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_rejects_unknown_labels() {
        let medium: Difficulty = serde_json::from_str(r#""medium""#).unwrap();
        assert_eq!(medium, Difficulty::Medium);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert!(serde_json::from_str::<Difficulty>(r#""mid""#).is_err());
    }

    #[test]
    fn question_uses_camel_case_json() {
        let json = r#"{
            "id": 7,
            "prompt": "2 + 2?",
            "options": ["4", "5"],
            "correctIndex": 0,
            "baseDifficulty": "hard",
            "explanation": "arithmetic"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.correct_index, 0);
        assert_eq!(question.base_difficulty, Difficulty::Hard);
    }

    #[test]
    fn phase_serializes_screaming_snake_case() {
        let value = serde_json::to_value(QuizPhase::AwaitingAnswer).unwrap();
        assert_eq!(value, serde_json::json!("AWAITING_ANSWER"));
        assert_eq!(QuizPhase::Complete.to_string(), "COMPLETE");
    }
}
