//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/studytrail/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/studytrail/` (~/.config/studytrail/)
//! - Data: `$XDG_DATA_HOME/studytrail/` (~/.local/share/studytrail/)
//! - State/Logs: `$XDG_STATE_HOME/studytrail/` (~/.local/state/studytrail/)

use crate::analytics::{InsightConfig, TopicConfig};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Chat endpoint configuration for AI insights (optional)
    #[serde(default)]
    pub chat: Option<ChatConfig>,

    /// Analytics threshold configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Model to use (e.g., "gemini-1.5-flash")
    pub model: String,

    /// API endpoint base URL
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,

    /// API key (can also use the STUDYTRAIL_API_KEY env var)
    pub api_key: Option<String>,

    /// Default output token ceiling for replies
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Resolve the API key from config or environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("STUDYTRAIL_API_KEY").ok())
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(Error::Config("chat.model must not be empty".to_string()));
        }
        if self.endpoint.is_empty() {
            return Err(Error::Config("chat.endpoint must not be empty".to_string()));
        }
        if self.max_output_tokens == 0 {
            return Err(Error::Config(
                "chat.max_output_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_chat_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_max_output_tokens() -> u32 {
    512
}

fn default_chat_timeout() -> u64 {
    30
}

/// Analytics threshold configuration
///
/// Mirrors the named policy constants in the analytics modules; every field
/// defaults to its constant and can be overridden here.
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Minimum sessions before a topic phrase is retained
    #[serde(default = "default_min_topic_sessions")]
    pub min_topic_sessions: usize,

    /// Accuracy-point margin used for trend classification
    #[serde(default = "default_trend_margin")]
    pub trend_margin: f64,

    /// Stddev-to-score scale for the consistency computation
    #[serde(default = "default_consistency_scale")]
    pub consistency_scale: f64,

    /// Average accuracy below this is high concern outright
    #[serde(default = "default_high_accuracy_cutoff")]
    pub high_accuracy_cutoff: f64,

    /// Average accuracy below this (above the high cutoff) is medium concern
    #[serde(default = "default_medium_accuracy_cutoff")]
    pub medium_accuracy_cutoff: f64,

    /// Consistency floor under which a declining trend escalates concern
    #[serde(default = "default_low_consistency_cutoff")]
    pub low_consistency_cutoff: f64,

    /// Ranking penalty budget applied to low-session topics
    #[serde(default = "default_low_attempt_penalty")]
    pub low_attempt_penalty: f64,

    /// Target average questions per bucket before volume is flagged
    #[serde(default = "default_question_target")]
    pub question_target: f64,

    /// Days without sessions before a gap is flagged
    #[serde(default = "default_gap_alert_days")]
    pub gap_alert_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            min_topic_sessions: default_min_topic_sessions(),
            trend_margin: default_trend_margin(),
            consistency_scale: default_consistency_scale(),
            high_accuracy_cutoff: default_high_accuracy_cutoff(),
            medium_accuracy_cutoff: default_medium_accuracy_cutoff(),
            low_consistency_cutoff: default_low_consistency_cutoff(),
            low_attempt_penalty: default_low_attempt_penalty(),
            question_target: default_question_target(),
            gap_alert_days: default_gap_alert_days(),
        }
    }
}

impl AnalyticsConfig {
    /// Topic-scoring thresholds with the configured overrides applied.
    pub fn topic_config(&self) -> TopicConfig {
        TopicConfig {
            min_sessions: self.min_topic_sessions,
            trend_margin: self.trend_margin,
            consistency_scale: self.consistency_scale,
            high_accuracy_cutoff: self.high_accuracy_cutoff,
            medium_accuracy_cutoff: self.medium_accuracy_cutoff,
            low_consistency_cutoff: self.low_consistency_cutoff,
            low_attempt_penalty: self.low_attempt_penalty,
        }
    }

    /// Insight-rule thresholds with the configured overrides applied.
    pub fn insight_config(&self) -> InsightConfig {
        InsightConfig {
            accuracy_delta: self.trend_margin,
            question_target: self.question_target,
            gap_alert_days: self.gap_alert_days,
        }
    }
}

fn default_min_topic_sessions() -> usize {
    crate::analytics::topics::DEFAULT_MIN_SESSIONS
}

fn default_trend_margin() -> f64 {
    crate::analytics::topics::DEFAULT_TREND_MARGIN
}

fn default_consistency_scale() -> f64 {
    crate::analytics::topics::DEFAULT_CONSISTENCY_SCALE
}

fn default_high_accuracy_cutoff() -> f64 {
    crate::analytics::topics::HIGH_CONCERN_ACCURACY
}

fn default_medium_accuracy_cutoff() -> f64 {
    crate::analytics::topics::MEDIUM_CONCERN_ACCURACY
}

fn default_low_consistency_cutoff() -> f64 {
    crate::analytics::topics::LOW_CONSISTENCY_CUTOFF
}

fn default_low_attempt_penalty() -> f64 {
    crate::analytics::topics::LOW_ATTEMPT_PENALTY
}

fn default_question_target() -> f64 {
    crate::analytics::insights::DEFAULT_QUESTION_TARGET
}

fn default_gap_alert_days() -> i64 {
    crate::analytics::insights::DEFAULT_GAP_ALERT_DAYS
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/studytrail/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("studytrail").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/studytrail/`
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("studytrail")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/studytrail/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("studytrail")
    }

    /// Returns the database file path
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("studytrail.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.chat.is_none());
        assert_eq!(config.analytics.min_topic_sessions, 1);
        assert_eq!(config.analytics.trend_margin, 5.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[chat]
model = "gemini-1.5-flash"
api_key = "test-key"

[analytics]
min_topic_sessions = 2
question_target = 50

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        let chat = config.chat.unwrap();
        assert_eq!(chat.model, "gemini-1.5-flash");
        assert_eq!(chat.max_output_tokens, 512);
        assert_eq!(config.analytics.min_topic_sessions, 2);
        assert_eq!(config.analytics.question_target, 50.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_paths_follow_xdg_layout() {
        assert!(Config::config_path().ends_with("studytrail/config.toml"));
        assert!(Config::database_path().starts_with(Config::data_dir()));
        assert!(Config::log_path().starts_with(Config::state_dir()));
        assert!(Config::log_path().ends_with("studytrail.log"));
    }

    #[test]
    fn test_chat_config_validation() {
        let config = ChatConfig {
            model: String::new(),
            endpoint: default_chat_endpoint(),
            api_key: None,
            max_output_tokens: 512,
            timeout_secs: 30,
        };
        assert!(config.validate().is_err());

        let config = ChatConfig {
            model: "gemini-1.5-flash".to_string(),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_overrides_flow_through() {
        let toml = r#"
[analytics]
min_topic_sessions = 3
trend_margin = 10.0
high_accuracy_cutoff = 60.0
low_attempt_penalty = 20.0
gap_alert_days = 14
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let topic = config.analytics.topic_config();
        assert_eq!(topic.min_sessions, 3);
        assert_eq!(topic.trend_margin, 10.0);
        assert_eq!(topic.high_accuracy_cutoff, 60.0);
        assert_eq!(topic.low_attempt_penalty, 20.0);
        // Unset thresholds keep their defaults
        assert_eq!(
            topic.medium_accuracy_cutoff,
            crate::analytics::topics::MEDIUM_CONCERN_ACCURACY
        );

        let insight = config.analytics.insight_config();
        assert_eq!(insight.gap_alert_days, 14);
    }
}
