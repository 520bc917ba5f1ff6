//! Emotion/engagement driven adaptation rules.
//!
//! All functions here are pure: the same sample always yields the same
//! result, and nothing is cached between calls.

use serde::{Deserialize, Serialize};

use crate::quiz::error::QuizError;
use crate::quiz::types::Difficulty;

pub const CONFUSED: &str = "confused";
pub const ENGAGED: &str = "engaged";
pub const DEFAULT_EMOTION: &str = "neutral";
pub const DEFAULT_ENGAGEMENT: u8 = 75;

pub const LOW_ENGAGEMENT_THRESHOLD: u8 = 60;
pub const HIGH_ENGAGEMENT_THRESHOLD: u8 = 85;
pub const MAX_ENGAGEMENT: i32 = 100;

/// Latest reading from the emotion sensor. Only the most recent sample is
/// ever kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    emotion: String,
    engagement: u8,
}

impl EmotionSample {
    pub fn new(emotion: impl Into<String>, engagement: i32) -> Result<Self, QuizError> {
        if !(0..=MAX_ENGAGEMENT).contains(&engagement) {
            return Err(QuizError::invalid_argument(format!(
                "engagement must be within 0..=100, got {engagement}"
            )));
        }
        Ok(Self {
            emotion: emotion.into(),
            engagement: engagement as u8,
        })
    }

    pub fn emotion(&self) -> &str {
        &self.emotion
    }

    pub fn engagement(&self) -> u8 {
        self.engagement
    }

    pub fn is_confused(&self) -> bool {
        self.emotion == CONFUSED
    }

    /// Confused or disengaged learners get simplified material.
    pub fn needs_support(&self) -> bool {
        self.is_confused() || self.engagement < LOW_ENGAGEMENT_THRESHOLD
    }
}

impl Default for EmotionSample {
    fn default() -> Self {
        Self {
            emotion: DEFAULT_EMOTION.to_string(),
            engagement: DEFAULT_ENGAGEMENT,
        }
    }
}

pub fn effective_difficulty(base: Difficulty, sample: &EmotionSample) -> Difficulty {
    if sample.needs_support() {
        Difficulty::Easy
    } else {
        base
    }
}

pub fn hint_available(sample: &EmotionSample) -> bool {
    sample.is_confused()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLevel {
    Simplified,
    Standard,
    Advanced,
}

impl ContentLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simplified => "simplified",
            Self::Standard => "standard",
            Self::Advanced => "advanced",
        }
    }
}

pub fn content_level(sample: &EmotionSample) -> ContentLevel {
    if sample.needs_support() {
        ContentLevel::Simplified
    } else if sample.emotion == ENGAGED && sample.engagement > HIGH_ENGAGEMENT_THRESHOLD {
        ContentLevel::Advanced
    } else {
        ContentLevel::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(emotion: &str, engagement: i32) -> EmotionSample {
        EmotionSample::new(emotion, engagement).unwrap()
    }

    #[test]
    fn test_engagement_bounds() {
        assert!(EmotionSample::new("focused", 0).is_ok());
        assert!(EmotionSample::new("focused", 100).is_ok());
        assert!(EmotionSample::new("focused", -1).unwrap_err().is_invalid_argument());
        assert!(EmotionSample::new("focused", 101).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_confused_forces_easy() {
        let s = sample("confused", 95);
        assert_eq!(effective_difficulty(Difficulty::Hard, &s), Difficulty::Easy);
        assert_eq!(effective_difficulty(Difficulty::Medium, &s), Difficulty::Easy);
    }

    #[test]
    fn test_low_engagement_forces_easy() {
        let s = sample("focused", 59);
        assert_eq!(effective_difficulty(Difficulty::Hard, &s), Difficulty::Easy);
    }

    #[test]
    fn test_threshold_keeps_base() {
        let s = sample("focused", 60);
        assert_eq!(effective_difficulty(Difficulty::Hard, &s), Difficulty::Hard);
        assert_eq!(effective_difficulty(Difficulty::Easy, &s), Difficulty::Easy);
    }

    #[test]
    fn test_default_sample_keeps_base() {
        let s = EmotionSample::default();
        assert_eq!(s.emotion(), "neutral");
        assert_eq!(s.engagement(), 75);
        assert_eq!(effective_difficulty(Difficulty::Medium, &s), Difficulty::Medium);
    }

    #[test]
    fn test_hint_only_when_confused() {
        assert!(hint_available(&sample("confused", 90)));
        assert!(!hint_available(&sample("neutral", 10)));
    }

    #[test]
    fn test_content_level() {
        assert_eq!(content_level(&sample("confused", 99)), ContentLevel::Simplified);
        assert_eq!(content_level(&sample("excited", 40)), ContentLevel::Simplified);
        assert_eq!(content_level(&sample("engaged", 86)), ContentLevel::Advanced);
        assert_eq!(content_level(&sample("engaged", 85)), ContentLevel::Standard);
        assert_eq!(content_level(&sample("focused", 99)), ContentLevel::Standard);
    }
}
