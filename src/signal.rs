//! Emotion/engagement sources feeding the quiz engine.
//!
//! Real capture and recognition live outside this crate; the sources here
//! stand in for a sensor pipeline that reports a label and an engagement
//! score every couple of seconds.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::quiz::adaptation::EmotionSample;
use crate::quiz::error::QuizError;

pub const SIMULATED_EMOTIONS: [&str; 5] = ["focused", "confused", "engaged", "neutral", "excited"];
pub const SIMULATED_ENGAGEMENT_MIN: i32 = 60;
pub const SIMULATED_ENGAGEMENT_MAX: i32 = 99;

pub trait EmotionSource: Send {
    fn sample(&mut self) -> EmotionSample;
}

/// Uniformly random labels with engagement in `60..=99`.
pub struct SimulatedEmotionSource {
    rng: StdRng,
}

impl SimulatedEmotionSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedEmotionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionSource for SimulatedEmotionSource {
    fn sample(&mut self) -> EmotionSample {
        let emotion = SIMULATED_EMOTIONS[self.rng.random_range(0..SIMULATED_EMOTIONS.len())];
        let engagement = self
            .rng
            .random_range(SIMULATED_ENGAGEMENT_MIN..=SIMULATED_ENGAGEMENT_MAX);
        EmotionSample::new(emotion, engagement).unwrap_or_default()
    }
}

/// Replays a fixed list of samples in a loop.
pub struct ScriptedEmotionSource {
    samples: VecDeque<EmotionSample>,
}

impl ScriptedEmotionSource {
    pub fn new(samples: Vec<EmotionSample>) -> Result<Self, QuizError> {
        if samples.is_empty() {
            return Err(QuizError::InvalidArgument(
                "scripted emotion source needs at least one sample".to_string(),
            ));
        }
        Ok(Self {
            samples: samples.into(),
        })
    }
}

impl EmotionSource for ScriptedEmotionSource {
    fn sample(&mut self) -> EmotionSample {
        // Non-empty by construction.
        let next = self.samples.pop_front().unwrap_or_default();
        self.samples.push_back(next.clone());
        next
    }
}
