use std::path::PathBuf;
use std::time::Duration;

use crate::quiz::engine::DEFAULT_PER_QUESTION_SECONDS;

const DEFAULT_SIGNAL_INTERVAL_MS: u64 = 2000;
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Set when `ENABLE_FILE_LOGS` is on; `LOG_DIR` overrides the location.
    pub log_dir: Option<PathBuf>,
    pub per_question_seconds: u32,
    pub bank_path: Option<PathBuf>,
    pub signal_interval: Duration,
    pub signal_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|value| matches!(value.trim(), "true" | "1"))
            .unwrap_or(false);
        let log_dir = file_logs.then(|| {
            lookup("LOG_DIR")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
        });

        let per_question_seconds = lookup("QUIZ_PER_QUESTION_SECONDS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_PER_QUESTION_SECONDS);

        let bank_path = lookup("QUIZ_BANK_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let signal_interval_ms = lookup("QUIZ_SIGNAL_INTERVAL_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_SIGNAL_INTERVAL_MS);

        let signal_seed = lookup("QUIZ_SIGNAL_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        Self {
            log_level,
            log_dir,
            per_question_seconds,
            bank_path,
            signal_interval: Duration::from_millis(signal_interval_ms),
            signal_seed,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.per_question_seconds, 30);
        assert_eq!(config.bank_path, None);
        assert_eq!(config.signal_interval, Duration::from_secs(2));
        assert_eq!(config.signal_seed, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("RUST_LOG", "debug"),
            ("QUIZ_PER_QUESTION_SECONDS", "45"),
            ("QUIZ_BANK_PATH", "bank.json"),
            ("QUIZ_SIGNAL_INTERVAL_MS", "500"),
            ("QUIZ_SIGNAL_SEED", "9"),
        ]);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.per_question_seconds, 45);
        assert_eq!(config.bank_path, Some(PathBuf::from("bank.json")));
        assert_eq!(config.signal_interval, Duration::from_millis(500));
        assert_eq!(config.signal_seed, Some(9));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("QUIZ_PER_QUESTION_SECONDS", "0"),
            ("QUIZ_SIGNAL_INTERVAL_MS", "soon"),
            ("QUIZ_BANK_PATH", "  "),
        ]);
        assert_eq!(config.per_question_seconds, 30);
        assert_eq!(config.signal_interval, Duration::from_secs(2));
        assert_eq!(config.bank_path, None);
    }

    #[test]
    fn test_file_logs_enabled() {
        let config = config_from(&[("ENABLE_FILE_LOGS", "1")]);
        assert_eq!(config.log_dir, Some(PathBuf::from("./logs")));

        let config = config_from(&[("ENABLE_FILE_LOGS", "true"), ("LOG_DIR", "/var/log/quiz")]);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/quiz")));
    }

    #[test]
    fn test_log_dir_ignored_without_file_logs() {
        let config = config_from(&[("LOG_DIR", "/var/log/quiz")]);
        assert_eq!(config.log_dir, None);

        let config = config_from(&[("ENABLE_FILE_LOGS", "yes"), ("LOG_DIR", "/var/log/quiz")]);
        assert_eq!(config.log_dir, None);
    }
}
