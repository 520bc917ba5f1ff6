pub mod adaptation;
pub mod bank;
pub mod engine;
pub mod error;
pub mod types;

pub use adaptation::{content_level, effective_difficulty, hint_available, ContentLevel, EmotionSample};
pub use bank::{BankError, QuestionBank};
pub use engine::{AdaptiveQuizEngine, QuizConfig, DEFAULT_PER_QUESTION_SECONDS};
pub use error::QuizError;
pub use types::{
    AnswerOutcome, Difficulty, EffectiveQuestion, Question, QuizPhase, QuizSnapshot, TickOutcome,
};
