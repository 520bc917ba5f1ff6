use crate::quiz::adaptation::{self, EmotionSample};
use crate::quiz::bank::{builtin_questions, QuestionBank};
use crate::quiz::error::QuizError;
use crate::quiz::types::{
    AnswerOutcome, Difficulty, EffectiveQuestion, Question, QuizPhase, QuizSnapshot, TickOutcome,
};

pub const DEFAULT_PER_QUESTION_SECONDS: u32 = 30;
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub per_question_seconds: u32,
    pub questions: Vec<Question>,
}

impl QuizConfig {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            per_question_seconds: DEFAULT_PER_QUESTION_SECONDS,
            questions,
        }
    }

    pub fn with_per_question_seconds(mut self, seconds: u32) -> Self {
        self.per_question_seconds = seconds;
        self
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new(builtin_questions())
    }
}

/// Mutable state of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuizSession {
    phase: QuizPhase,
    current_index: usize,
    selected_answer: Option<usize>,
    score: u32,
    streak: u32,
    time_remaining_seconds: u32,
    answered_count: u32,
    last_outcome: Option<AnswerOutcome>,
    // Difficulty shown at the moment of reveal; later signals must not alter it.
    revealed_difficulty: Option<Difficulty>,
    signal: EmotionSample,
}

impl QuizSession {
    fn new(per_question_seconds: u32) -> Self {
        Self {
            phase: QuizPhase::AwaitingAnswer,
            current_index: 0,
            selected_answer: None,
            score: 0,
            streak: 0,
            time_remaining_seconds: per_question_seconds,
            answered_count: 0,
            last_outcome: None,
            revealed_difficulty: None,
            signal: EmotionSample::default(),
        }
    }
}

/// Per-question state machine:
/// `AWAITING_ANSWER -> REVEALED -> (AWAITING_ANSWER | COMPLETE)`.
///
/// The engine has no clock of its own. A driver calls [`timer_tick`] once per
/// elapsed second while the phase is `AWAITING_ANSWER`.
///
/// [`timer_tick`]: AdaptiveQuizEngine::timer_tick
#[derive(Debug, Clone)]
pub struct AdaptiveQuizEngine {
    bank: QuestionBank,
    per_question_seconds: u32,
    session: QuizSession,
}

impl AdaptiveQuizEngine {
    pub fn new(config: QuizConfig) -> Result<Self, QuizError> {
        let bank = QuestionBank::new(config.questions)?;
        Self::from_bank(bank, config.per_question_seconds)
    }

    pub fn from_bank(bank: QuestionBank, per_question_seconds: u32) -> Result<Self, QuizError> {
        if per_question_seconds == 0 {
            return Err(QuizError::invalid_argument(
                "perQuestionSeconds must be greater than 0",
            ));
        }
        Ok(Self {
            bank,
            per_question_seconds,
            session: QuizSession::new(per_question_seconds),
        })
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn per_question_seconds(&self) -> u32 {
        self.per_question_seconds
    }

    pub fn phase(&self) -> QuizPhase {
        self.session.phase
    }

    pub fn signal(&self) -> &EmotionSample {
        &self.session.signal
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.session.current_index)
    }

    pub fn select_answer(&mut self, index: usize) -> Result<(), QuizError> {
        self.require_phase("selectAnswer", QuizPhase::AwaitingAnswer)?;
        let options = self.current_options_len();
        if index >= options {
            return Err(QuizError::invalid_argument(format!(
                "answer index {index} out of range for {options} options"
            )));
        }
        self.session.selected_answer = Some(index);
        tracing::debug!(question = self.session.current_index, index, "answer selected");
        Ok(())
    }

    pub fn submit(&mut self) -> Result<AnswerOutcome, QuizError> {
        self.require_phase("submit", QuizPhase::AwaitingAnswer)?;
        let Some(selected) = self.session.selected_answer else {
            return Err(QuizError::invalid_state(
                "submit",
                self.session.phase,
                "no answer selected",
            ));
        };
        let question = self.require_question()?;
        let difficulty = self.effective_difficulty(question);

        let outcome = if selected == question.correct_index {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        };
        self.reveal(outcome, difficulty);
        Ok(outcome)
    }

    pub fn timer_tick(&mut self) -> Result<TickOutcome, QuizError> {
        self.require_phase("timerTick", QuizPhase::AwaitingAnswer)?;
        if self.session.time_remaining_seconds == 0 {
            return Err(QuizError::invalid_state(
                "timerTick",
                self.session.phase,
                "timer already expired",
            ));
        }
        let difficulty = self.effective_difficulty(self.require_question()?);

        self.session.time_remaining_seconds -= 1;
        if self.session.time_remaining_seconds > 0 {
            return Ok(TickOutcome::Running(self.session.time_remaining_seconds));
        }
        self.reveal(AnswerOutcome::TimedOut, difficulty);
        Ok(TickOutcome::TimedOut)
    }

    pub fn advance(&mut self) -> Result<QuizPhase, QuizError> {
        self.require_phase("advance", QuizPhase::Revealed)?;
        let session = &mut self.session;
        session.selected_answer = None;
        session.last_outcome = None;
        session.revealed_difficulty = None;

        if session.current_index + 1 < self.bank.len() {
            session.current_index += 1;
            session.time_remaining_seconds = self.per_question_seconds;
            session.phase = QuizPhase::AwaitingAnswer;
            tracing::debug!(question = session.current_index, "advanced to next question");
        } else {
            session.current_index = self.bank.len();
            session.phase = QuizPhase::Complete;
            tracing::info!(
                score = session.score,
                answered = session.answered_count,
                total = self.bank.len(),
                "quiz completed"
            );
        }
        Ok(session.phase)
    }

    /// Stores the latest sensor reading. Valid in every phase, including
    /// `COMPLETE`.
    pub fn update_signal(
        &mut self,
        emotion: impl Into<String>,
        engagement: i32,
    ) -> Result<(), QuizError> {
        let sample = EmotionSample::new(emotion, engagement)?;
        self.apply_signal(sample);
        Ok(())
    }

    pub fn apply_signal(&mut self, sample: EmotionSample) {
        tracing::trace!(
            emotion = sample.emotion(),
            engagement = sample.engagement(),
            "signal updated"
        );
        self.session.signal = sample;
    }

    pub fn effective_difficulty(&self, question: &Question) -> Difficulty {
        adaptation::effective_difficulty(question.base_difficulty, &self.session.signal)
    }

    pub fn reset(&mut self) {
        self.session = QuizSession::new(self.per_question_seconds);
        tracing::debug!("quiz session reset");
    }

    pub fn accuracy_percent(&self) -> u32 {
        round_percent(self.session.score as usize, self.session.answered_count as usize)
    }

    pub fn points_earned(&self) -> u32 {
        self.session.score * POINTS_PER_CORRECT
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        let session = &self.session;
        let question = self.current_question().map(|q| {
            let difficulty = session
                .revealed_difficulty
                .unwrap_or_else(|| self.effective_difficulty(q));
            EffectiveQuestion::from_question(q, difficulty)
        });

        QuizSnapshot {
            state: session.phase,
            current_index: session.current_index,
            total_questions: self.bank.len(),
            question,
            selected_answer: session.selected_answer,
            revealed: session.phase == QuizPhase::Revealed,
            last_outcome: session.last_outcome,
            score: session.score,
            streak: session.streak,
            time_remaining_seconds: session.time_remaining_seconds,
            answered_count: session.answered_count,
            accuracy_percent: self.accuracy_percent(),
            points_earned: self.points_earned(),
            progress_percent: round_percent(session.current_index, self.bank.len()),
            hint_available: adaptation::hint_available(&session.signal),
            content_level: adaptation::content_level(&session.signal),
        }
    }

    fn reveal(&mut self, outcome: AnswerOutcome, difficulty: Difficulty) {
        let session = &mut self.session;
        if outcome.is_correct() {
            session.score += 1;
            session.streak += 1;
        } else {
            session.streak = 0;
        }
        session.answered_count += 1;
        session.last_outcome = Some(outcome);
        session.revealed_difficulty = Some(difficulty);
        session.phase = QuizPhase::Revealed;
        tracing::debug!(
            question = session.current_index,
            ?outcome,
            %difficulty,
            score = session.score,
            streak = session.streak,
            "question revealed"
        );
    }

    fn require_phase(&self, operation: &'static str, expected: QuizPhase) -> Result<(), QuizError> {
        if self.session.phase == expected {
            return Ok(());
        }
        tracing::debug!(operation, phase = %self.session.phase, "operation rejected");
        let reason = match self.session.phase {
            QuizPhase::Complete => "quiz is complete",
            QuizPhase::Revealed => "answer already revealed",
            QuizPhase::AwaitingAnswer => "answer not yet revealed",
        };
        Err(QuizError::invalid_state(operation, self.session.phase, reason))
    }

    fn require_question(&self) -> Result<&Question, QuizError> {
        self.current_question().ok_or_else(|| {
            QuizError::invalid_state("currentQuestion", self.session.phase, "no active question")
        })
    }

    fn current_options_len(&self) -> usize {
        self.current_question().map_or(0, |q| q.options.len())
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
fn round_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}
