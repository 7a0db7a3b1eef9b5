//! Configuration loading, validation, and management for Greenlight.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides (`GREENLIGHT_*`). Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use greenlight_core::profile::AgentProfile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure. Maps directly to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document title for reports.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub caller: CallerConfig,

    /// Agents taking part in the review. Each entry names a built-in
    /// profile or one defined in `custom_profiles`.
    #[serde(default)]
    pub agents: Vec<String>,

    /// Fully custom reviewer profiles.
    #[serde(default)]
    pub custom_profiles: Vec<AgentProfile>,
}

/// Review loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Recent buffer capacity K.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Optional sweep threshold: open questions whose importance decays
    /// below this are marked irrelevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prune_threshold: Option<f32>,
}

fn default_buffer_capacity() -> usize {
    5
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            prune_threshold: None,
        }
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_min_question_importance")]
    pub min_question_importance: f32,

    /// When set, contexts carry only the most important N digests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_cap: Option<usize>,

    #[serde(default = "default_journey_window")]
    pub journey_window: usize,
}

fn default_min_question_importance() -> f32 {
    0.4
}
fn default_journey_window() -> usize {
    8
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            min_question_importance: default_min_question_importance(),
            digest_cap: None,
            journey_window: default_journey_window(),
        }
    }
}

/// Agent caller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    60
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    500
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        debug!(path = %path.display(), agents = config.agents.len(), "Config loaded");
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("GREENLIGHT_BUFFER_CAPACITY") {
            if let Ok(parsed) = value.parse() {
                self.review.buffer_capacity = parsed;
            }
        }
        if let Ok(value) = std::env::var("GREENLIGHT_CALL_TIMEOUT_SECS") {
            if let Ok(parsed) = value.parse() {
                self.caller.timeout_secs = parsed;
            }
        }
        if let Ok(value) = std::env::var("GREENLIGHT_MAX_ATTEMPTS") {
            if let Ok(parsed) = value.parse() {
                self.caller.max_attempts = parsed;
            }
        }
        if let Ok(value) = std::env::var("GREENLIGHT_AGENTS") {
            let agents: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !agents.is_empty() {
                self.agents = agents;
            }
        }
    }

    /// Validate settings. Called by `load`; call directly after
    /// programmatic construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "review.buffer_capacity must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.context.min_question_importance) {
            return Err(ConfigError::Invalid(
                "context.min_question_importance must be within [0, 1]".into(),
            ));
        }
        if let Some(threshold) = self.review.prune_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid(
                    "review.prune_threshold must be within [0, 1]".into(),
                ));
            }
        }
        if self.caller.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "caller.max_attempts must be at least 1".into(),
            ));
        }
        for agent in &self.agents {
            if self.resolve_profile(agent).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "unknown agent profile '{agent}'"
                )));
            }
        }
        Ok(())
    }

    /// Resolve an agent id to a profile: custom profiles first, then the
    /// built-in roster.
    pub fn resolve_profile(&self, id: &str) -> Option<AgentProfile> {
        self.custom_profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .or_else(|| AgentProfile::builtin(id))
    }

    /// The resolved roster for this run. Falls back to the default pair
    /// of built-ins when no agents are configured.
    pub fn roster(&self) -> Vec<AgentProfile> {
        if self.agents.is_empty() {
            return vec![
                AgentProfile::builtin("mainstream_fan").expect("built-in profile"),
                AgentProfile::builtin("indie_critic").expect("built-in profile"),
            ];
        }
        self.agents
            .iter()
            .filter_map(|id| self.resolve_profile(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.review.buffer_capacity, 5);
        assert_eq!(config.roster().len(), 2);
    }

    #[test]
    fn load_from_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("greenlight.toml");
        fs::write(
            &path,
            r#"
title = "Bad Hombres"
agents = ["indie_critic", "thriller_junkie"]

[review]
buffer_capacity = 3
prune_threshold = 0.15

[context]
digest_cap = 10

[caller]
timeout_secs = 30
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.title.as_deref(), Some("Bad Hombres"));
        assert_eq!(config.review.buffer_capacity, 3);
        assert_eq!(config.review.prune_threshold, Some(0.15));
        assert_eq!(config.context.digest_cap, Some(10));
        assert_eq!(config.caller.timeout_secs, 30);
        assert_eq!(config.roster().len(), 2);
    }

    #[test]
    fn unknown_agent_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("greenlight.toml");
        fs::write(&path, r#"agents = ["nonexistent_profile"]"#).unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("nonexistent_profile"));
    }

    #[test]
    fn custom_profile_resolves() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("greenlight.toml");
        fs::write(
            &path,
            r#"
agents = ["house_style"]

[[custom_profiles]]
id = "house_style"
name = "House Reader"
voice = "You read for the house. Be specific."
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        let roster = config.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "House Reader");
        // Serde defaults fill the unspecified traits.
        assert!((roster[0].patience - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_buffer_capacity_rejected() {
        let config = AppConfig {
            review: ReviewConfig {
                buffer_capacity: 0,
                prune_threshold: None,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/greenlight.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
