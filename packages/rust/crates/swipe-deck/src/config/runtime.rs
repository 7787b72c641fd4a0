//! Resolve merged settings + environment into a typed orchestrator config.

use std::time::Duration;

use thiserror::Error;

use super::settings::SwipeSettings;
use crate::gesture::GestureThresholds;
use crate::orchestrator::OrchestratorConfig;

const SWIPE_THRESHOLD_ENV: &str = "SWIPE_DECK_SWIPE_THRESHOLD";
const DECISION_TIMEOUT_ENV: &str = "SWIPE_DECK_DECISION_TIMEOUT_MS";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Value could not be parsed.
    #[error("invalid value for {name}: `{raw}`")]
    Unparsable {
        /// Setting or environment variable.
        name: String,
        /// Rejected input.
        raw: String,
    },

    /// Value parsed but is out of range.
    #[error("{name} must be greater than 0 (got {value})")]
    NotPositive {
        /// Setting or environment variable.
        name: String,
        /// Rejected value.
        value: String,
    },
}

impl OrchestratorConfig {
    /// Build a config for `session_id` from settings, environment overrides and defaults.
    ///
    /// # Errors
    /// `SettingsError` when an environment override does not parse or a
    /// threshold, timeout or page size is not positive.
    pub fn from_settings(
        session_id: impl Into<String>,
        settings: &SwipeSettings,
    ) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let gesture = &settings.gesture;
        let deck = &settings.deck;
        let decision = &settings.decision;

        let swipe_threshold = match non_empty_env(SWIPE_THRESHOLD_ENV) {
            Some(raw) => parse_f64(SWIPE_THRESHOLD_ENV, &raw)?,
            None => gesture
                .swipe_threshold
                .unwrap_or(defaults.thresholds.swipe_threshold),
        };
        let thresholds = GestureThresholds {
            swipe_threshold: positive_f64("gesture.swipe_threshold", swipe_threshold)?,
            details_threshold: positive_f64(
                "gesture.details_threshold",
                gesture
                    .details_threshold
                    .unwrap_or(defaults.thresholds.details_threshold),
            )?,
            velocity_threshold: positive_f64(
                "gesture.velocity_threshold",
                gesture
                    .velocity_threshold
                    .unwrap_or(defaults.thresholds.velocity_threshold),
            )?,
        };

        let timeout_ms = match non_empty_env(DECISION_TIMEOUT_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|_| SettingsError::Unparsable {
                name: DECISION_TIMEOUT_ENV.to_string(),
                raw: raw.clone(),
            })?,
            None => decision.timeout_ms.unwrap_or(duration_ms(defaults.decision_timeout)),
        };
        if timeout_ms == 0 {
            return Err(SettingsError::NotPositive {
                name: "decision.timeout_ms".to_string(),
                value: timeout_ms.to_string(),
            });
        }

        let page_size = deck.page_size.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(SettingsError::NotPositive {
                name: "deck.page_size".to_string(),
                value: page_size.to_string(),
            });
        }

        Ok(Self {
            session_id: session_id.into(),
            thresholds,
            visible_count: deck.visible_count.unwrap_or(defaults.visible_count).max(1),
            prefetch_threshold: deck.prefetch_threshold.unwrap_or(defaults.prefetch_threshold),
            page_size,
            decision_timeout: Duration::from_millis(timeout_ms),
            decision_retries: decision.retries.unwrap_or(defaults.decision_retries),
            retry_backoff: decision
                .retry_backoff_ms
                .map_or(defaults.retry_backoff, Duration::from_millis),
            event_capacity: settings
                .events
                .capacity
                .unwrap_or(defaults.event_capacity)
                .max(1),
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty_string)
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, SettingsError> {
    raw.parse::<f64>().map_err(|_| SettingsError::Unparsable {
        name: name.to_string(),
        raw: raw.to_string(),
    })
}

fn positive_f64(name: &str, value: f64) -> Result<f64, SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::NotPositive {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DeckSettings, DecisionSettings, GestureSettings};

    #[test]
    fn test_defaults_when_settings_are_empty() {
        let config = OrchestratorConfig::from_settings("s1", &SwipeSettings::default()).unwrap();
        let defaults = OrchestratorConfig::default();
        assert_eq!(config.session_id, "s1");
        assert_eq!(config.visible_count, defaults.visible_count);
        assert_eq!(config.page_size, defaults.page_size);
        assert_eq!(
            config.thresholds.details_threshold,
            defaults.thresholds.details_threshold
        );
    }

    #[test]
    fn test_settings_values_are_applied() {
        let settings = SwipeSettings {
            gesture: GestureSettings {
                details_threshold: Some(42.0),
                ..GestureSettings::default()
            },
            deck: DeckSettings {
                visible_count: Some(2),
                prefetch_threshold: Some(0),
                page_size: Some(7),
            },
            decision: DecisionSettings {
                retries: Some(0),
                retry_backoff_ms: Some(5),
                ..DecisionSettings::default()
            },
            ..SwipeSettings::default()
        };
        let config = OrchestratorConfig::from_settings("s1", &settings).unwrap();
        assert!((config.thresholds.details_threshold - 42.0).abs() < f64::EPSILON);
        assert_eq!(config.visible_count, 2);
        assert_eq!(config.prefetch_threshold, 0);
        assert_eq!(config.page_size, 7);
        assert_eq!(config.decision_retries, 0);
        assert_eq!(config.retry_backoff, Duration::from_millis(5));
    }

    #[test]
    fn test_non_positive_threshold_is_rejected() {
        let settings = SwipeSettings {
            gesture: GestureSettings {
                velocity_threshold: Some(0.0),
                ..GestureSettings::default()
            },
            ..SwipeSettings::default()
        };
        let error = OrchestratorConfig::from_settings("s1", &settings).unwrap_err();
        assert!(matches!(error, SettingsError::NotPositive { .. }));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let settings = SwipeSettings {
            deck: DeckSettings {
                page_size: Some(0),
                ..DeckSettings::default()
            },
            ..SwipeSettings::default()
        };
        assert!(OrchestratorConfig::from_settings("s1", &settings).is_err());
    }
}
