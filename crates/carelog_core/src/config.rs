//! Aggregation configuration.
//!
//! # Responsibility
//! - Select between the historical summary semantics (feed sum vs mean,
//!   milestone window on/off) and the user collection layout.
//! - Load overrides from JSON; every field falls back to its default.
//!
//! # Invariants
//! - `window_days` is at least 1.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// How in-window feed volumes collapse into one summary value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedAggregation {
    /// Total millilitres over the window.
    #[default]
    Sum,
    /// Arithmetic mean of valid feed cells over the window.
    Mean,
}

/// Which milestone rows count towards `milestone_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneScope {
    #[default]
    AllTime,
    /// Same rolling window as daily logs; rows with bad dates are dropped.
    Rolling,
}

/// Column layout of the user collection.
///
/// Older workbooks never stored a secret and shift every column after the
/// username one place left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserLayout {
    /// `[username, secret, child_name, dob, age_months, birth_weight, birth_height]`
    #[default]
    WithSecret,
    /// `[username, child_name, dob, age_months, birth_weight, birth_height]`
    WithoutSecret,
}

impl UserLayout {
    pub fn column_count(self) -> usize {
        match self {
            Self::WithSecret => 7,
            Self::WithoutSecret => 6,
        }
    }

    /// Offset applied to every column after the username.
    pub(crate) fn shift(self) -> usize {
        match self {
            Self::WithSecret => 1,
            Self::WithoutSecret => 0,
        }
    }

    /// Guesses the layout from a stored header row.
    pub fn detect(header: &[String]) -> Option<Self> {
        let populated = header
            .iter()
            .rposition(|label| !label.trim().is_empty())
            .map_or(0, |last| last + 1);
        match populated {
            7 => Some(Self::WithSecret),
            6 => Some(Self::WithoutSecret),
            _ => None,
        }
    }
}

/// Knobs for one summary aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// Trailing window length in days, counted back from the run date.
    pub window_days: u32,
    pub feed_aggregation: FeedAggregation,
    pub milestone_scope: MilestoneScope,
    pub user_layout: UserLayout,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            feed_aggregation: FeedAggregation::default(),
            milestone_scope: MilestoneScope::default(),
            user_layout: UserLayout::default(),
        }
    }
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::InvalidWindowDays(self.window_days));
        }
        Ok(())
    }

    /// Parses and validates a JSON document such as `{"feed_aggregation": "mean"}`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidWindowDays(u32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid summary config: {err}"),
            Self::InvalidWindowDays(days) => {
                write!(f, "window_days must be at least 1, got {days}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidWindowDays(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FeedAggregation, MilestoneScope, SummaryConfig, UserLayout};

    #[test]
    fn defaults_match_sum_and_all_time() {
        let config = SummaryConfig::default();
        assert_eq!(config.window_days, 7);
        assert_eq!(config.feed_aggregation, FeedAggregation::Sum);
        assert_eq!(config.milestone_scope, MilestoneScope::AllTime);
        assert_eq!(config.user_layout, UserLayout::WithSecret);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            SummaryConfig::from_json_str(r#"{"feed_aggregation":"mean","user_layout":"without_secret"}"#)
                .expect("partial config should parse");
        assert_eq!(config.feed_aggregation, FeedAggregation::Mean);
        assert_eq!(config.user_layout, UserLayout::WithoutSecret);
        assert_eq!(config.window_days, 7);
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = SummaryConfig::from_json_str(r#"{"window_days":0}"#)
            .expect_err("zero window should fail");
        assert!(matches!(err, ConfigError::InvalidWindowDays(0)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SummaryConfig::from_json_str(r#"{"window":7}"#)
            .expect_err("unknown field should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn layout_detection_uses_populated_header_width() {
        let seven: Vec<String> = (0..7).map(|i| format!("c{i}")).collect();
        let mut six: Vec<String> = (0..6).map(|i| format!("c{i}")).collect();
        assert_eq!(UserLayout::detect(&seven), Some(UserLayout::WithSecret));
        assert_eq!(UserLayout::detect(&six), Some(UserLayout::WithoutSecret));
        six.push(String::new());
        assert_eq!(UserLayout::detect(&six), Some(UserLayout::WithoutSecret));
        assert_eq!(UserLayout::detect(&[]), None);
    }
}
