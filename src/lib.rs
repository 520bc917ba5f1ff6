pub mod config;
pub mod driver;
pub mod logging;
pub mod quiz;
pub mod signal;

pub use driver::{DriverError, QuizDriver, QuizHandle};
pub use quiz::{AdaptiveQuizEngine, QuizConfig, QuizError, QuizSnapshot};
