use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Reminder cadence for quotes waiting on a client answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    /// Hours after the quote was sent (or after the previous reminder) for each stage
    pub stage_delays_hours: Vec<i64>,
    /// Failed sends allowed per stage before the follow-up is marked failed
    pub max_attempts: u32,
    pub retry_delay_minutes: i64,
    /// Delay applied to active follow-ups once the client opened the quote
    pub viewed_delay_hours: i64,
    pub scheduler_interval_secs: u64,
    pub enabled: bool,
}

impl FollowUpConfig {
    /// Expected environment variables (all optional):
    /// - FOLLOW_UP_STAGE_DELAYS_HOURS: comma separated list, defaults to "72,168,336"
    /// - FOLLOW_UP_MAX_ATTEMPTS: defaults to 3
    /// - FOLLOW_UP_RETRY_DELAY_MINUTES: defaults to 60
    /// - FOLLOW_UP_VIEWED_DELAY_HOURS: defaults to 48
    /// - FOLLOW_UP_SCHEDULER_INTERVAL_SECS: defaults to 300
    /// - FOLLOW_UP_ENABLED: defaults to true
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading follow-up configuration from environment variables");
        let defaults = FollowUpConfig::default();

        let stage_delays_hours = match env::var("FOLLOW_UP_STAGE_DELAYS_HOURS") {
            Ok(raw) => parse_delays(&raw)?,
            Err(_) => {
                warn!("FOLLOW_UP_STAGE_DELAYS_HOURS not set, using default: 72,168,336");
                defaults.stage_delays_hours
            }
        };
        debug!(?stage_delays_hours, "Follow-up stage delays");

        let max_attempts = parse_var("FOLLOW_UP_MAX_ATTEMPTS", defaults.max_attempts)?;
        let retry_delay_minutes =
            parse_var("FOLLOW_UP_RETRY_DELAY_MINUTES", defaults.retry_delay_minutes)?;
        let viewed_delay_hours =
            parse_var("FOLLOW_UP_VIEWED_DELAY_HOURS", defaults.viewed_delay_hours)?;
        let scheduler_interval_secs =
            parse_var("FOLLOW_UP_SCHEDULER_INTERVAL_SECS", defaults.scheduler_interval_secs)?;
        let enabled = parse_var("FOLLOW_UP_ENABLED", defaults.enabled)?;

        let config = FollowUpConfig {
            stage_delays_hours,
            max_attempts,
            retry_delay_minutes,
            viewed_delay_hours,
            scheduler_interval_secs,
            enabled,
        };

        config.validate()?;
        info!("Follow-up configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stage_delays_hours.is_empty() {
            error!("No follow-up stage configured");
            return Err(ConfigError::ValidationError(
                "At least one follow-up stage is required".to_string(),
            ));
        }

        if self.stage_delays_hours.iter().any(|h| *h <= 0) {
            error!("Follow-up stage delay must be positive");
            return Err(ConfigError::ValidationError(
                "Follow-up stage delays must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "Follow-up max attempts must be greater than 0".to_string(),
            ));
        }

        if self.retry_delay_minutes <= 0 || self.viewed_delay_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "Follow-up delays must be greater than 0".to_string(),
            ));
        }

        if self.scheduler_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Scheduler interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn max_stages(&self) -> u32 {
        self.stage_delays_hours.len() as u32
    }

    /// Delay before the given 1-based stage fires, `None` past the last stage
    pub fn stage_delay(&self, stage: u32) -> Option<Duration> {
        let index = usize::try_from(stage.checked_sub(1)?).ok()?;
        self.stage_delays_hours.get(index).map(|h| Duration::hours(*h))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::minutes(self.retry_delay_minutes)
    }

    pub fn viewed_delay(&self) -> Duration {
        Duration::hours(self.viewed_delay_hours)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            error!("Invalid {} value: {}", name, raw);
            ConfigError::ParseError(format!("Invalid {} value: {}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_delays(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                error!("Invalid follow-up stage delay: {}", part);
                ConfigError::ParseError(format!("Invalid follow-up stage delay: {}", part))
            })
        })
        .collect()
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        FollowUpConfig {
            stage_delays_hours: vec![72, 168, 336],
            max_attempts: 3,
            retry_delay_minutes: 60,
            viewed_delay_hours: 48,
            scheduler_interval_secs: 300,
            enabled: true,
        }
    }
}
