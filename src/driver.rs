//! Async owner of one quiz engine.
//!
//! The driver task serializes every call into the engine: presentation
//! commands, emotion samples, and the one-second countdown all pass through
//! a single `select!` loop. The countdown exists only while the engine is
//! awaiting an answer and is dropped on every transition out of that phase.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::quiz::adaptation::EmotionSample;
use crate::quiz::engine::AdaptiveQuizEngine;
use crate::quiz::error::QuizError;
use crate::quiz::types::{QuizPhase, QuizSnapshot, TickOutcome};
use crate::signal::EmotionSource;

const COMMAND_CAPACITY: usize = 64;
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    SelectAnswer(usize),
    Submit,
    Advance,
    Reset,
    UpdateSignal(EmotionSample),
}

impl QuizCommand {
    fn restarts_countdown(&self) -> bool {
        matches!(self, QuizCommand::Advance | QuizCommand::Reset)
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error("quiz driver has stopped")]
    Closed,
}

type Reply = oneshot::Sender<Result<(), QuizError>>;

pub struct QuizDriver {
    engine: AdaptiveQuizEngine,
    tick_period: Duration,
    commands: mpsc::Receiver<(QuizCommand, Reply)>,
    snapshots: watch::Sender<QuizSnapshot>,
    countdown: Option<Interval>,
}

impl QuizDriver {
    /// Must be called from within a tokio runtime; the countdown is armed
    /// immediately if a question is open.
    pub fn new(engine: AdaptiveQuizEngine, tick_period: Duration) -> (Self, QuizHandle) {
        let tick_period = if tick_period.is_zero() {
            DEFAULT_TICK_PERIOD
        } else {
            tick_period
        };
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let mut driver = Self {
            engine,
            tick_period,
            commands: command_rx,
            snapshots: snapshot_tx,
            countdown: None,
        };
        if driver.engine.phase() == QuizPhase::AwaitingAnswer {
            driver.arm_countdown();
        }
        let handle = QuizHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (driver, handle)
    }

    /// Runs the driver on the current tokio runtime. The task ends once every
    /// [`QuizHandle`] has been dropped and yields the engine back.
    pub fn spawn(
        engine: AdaptiveQuizEngine,
        tick_period: Duration,
    ) -> (QuizHandle, JoinHandle<AdaptiveQuizEngine>) {
        let (driver, handle) = Self::new(engine, tick_period);
        (handle, tokio::spawn(driver.run()))
    }

    pub async fn run(mut self) -> AdaptiveQuizEngine {
        tracing::debug!(period_ms = self.tick_period.as_millis() as u64, "quiz driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some((command, reply)) = command else {
                        break;
                    };
                    let result = self.apply(command);
                    let _ = reply.send(result);
                }
                _ = next_tick(&mut self.countdown) => {
                    self.on_tick();
                }
            }
        }
        tracing::debug!("quiz driver stopped");
        self.engine
    }

    fn apply(&mut self, command: QuizCommand) -> Result<(), QuizError> {
        let restarts = command.restarts_countdown();
        let result = match command {
            QuizCommand::SelectAnswer(index) => self.engine.select_answer(index),
            QuizCommand::Submit => self.engine.submit().map(|_| ()),
            QuizCommand::Advance => self.engine.advance().map(|_| ()),
            QuizCommand::Reset => {
                self.engine.reset();
                Ok(())
            }
            QuizCommand::UpdateSignal(sample) => {
                self.engine.apply_signal(sample);
                Ok(())
            }
        };
        if let Err(ref err) = result {
            tracing::debug!(error = %err, "quiz command rejected");
            return result;
        }

        if self.engine.phase() != QuizPhase::AwaitingAnswer {
            self.countdown = None;
        } else if restarts {
            self.arm_countdown();
        }
        self.publish();
        result
    }

    fn on_tick(&mut self) {
        match self.engine.timer_tick() {
            Ok(TickOutcome::Running(_)) => {}
            Ok(TickOutcome::TimedOut) => {
                self.countdown = None;
                tracing::debug!("question timed out");
            }
            Err(err) => {
                self.countdown = None;
                tracing::warn!(error = %err, "countdown tick outside an open question");
            }
        }
        self.publish();
    }

    fn arm_countdown(&mut self) {
        let mut interval = time::interval_at(Instant::now() + self.tick_period, self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        self.countdown = Some(interval);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.engine.snapshot());
    }
}

async fn next_tick(countdown: &mut Option<Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Presentation-side handle. Cloning is cheap; the driver stops when the last
/// strong handle goes away.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::Sender<(QuizCommand, Reply)>,
    snapshots: watch::Receiver<QuizSnapshot>,
}

impl QuizHandle {
    pub fn snapshot(&self) -> QuizSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.snapshots.clone()
    }

    pub fn downgrade(&self) -> WeakQuizHandle {
        WeakQuizHandle {
            commands: self.commands.downgrade(),
            snapshots: self.snapshots.clone(),
        }
    }

    pub async fn select_answer(&self, index: usize) -> Result<(), DriverError> {
        self.send(QuizCommand::SelectAnswer(index)).await
    }

    pub async fn submit(&self) -> Result<(), DriverError> {
        self.send(QuizCommand::Submit).await
    }

    pub async fn advance(&self) -> Result<(), DriverError> {
        self.send(QuizCommand::Advance).await
    }

    pub async fn reset(&self) -> Result<(), DriverError> {
        self.send(QuizCommand::Reset).await
    }

    pub async fn update_signal(
        &self,
        emotion: impl Into<String>,
        engagement: i32,
    ) -> Result<(), DriverError> {
        let sample = EmotionSample::new(emotion, engagement)?;
        self.apply_signal(sample).await
    }

    pub async fn apply_signal(&self, sample: EmotionSample) -> Result<(), DriverError> {
        self.send(QuizCommand::UpdateSignal(sample)).await
    }

    pub async fn send(&self, command: QuizCommand) -> Result<(), DriverError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| DriverError::Closed)?;
        reply_rx.await.map_err(|_| DriverError::Closed)??;
        Ok(())
    }
}

/// Handle that does not keep the driver alive.
#[derive(Clone)]
pub struct WeakQuizHandle {
    commands: mpsc::WeakSender<(QuizCommand, Reply)>,
    snapshots: watch::Receiver<QuizSnapshot>,
}

impl WeakQuizHandle {
    pub fn upgrade(&self) -> Option<QuizHandle> {
        self.commands.upgrade().map(|commands| QuizHandle {
            commands,
            snapshots: self.snapshots.clone(),
        })
    }
}

/// Polls `source` every `period` and forwards each sample to the driver.
/// Stops on its own once the driver has shut down.
pub fn spawn_signal_pump<S>(mut source: S, period: Duration, handle: WeakQuizHandle) -> JoinHandle<()>
where
    S: EmotionSource + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Some(handle) = handle.upgrade() else {
                break;
            };
            let sample = source.sample();
            tracing::trace!(
                emotion = sample.emotion(),
                engagement = sample.engagement(),
                "emotion sample"
            );
            if let Err(DriverError::Closed) = handle.apply_signal(sample).await {
                break;
            }
        }
        tracing::debug!("signal pump stopped");
    })
}
