//! Engine configuration: operator identity, briefing policy, and ending timing.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    BRIEFING_EMPTY_RESPONSE_TEXT, BRIEFING_FALLBACK_TEXT, BRIEFING_TIMEOUT_MS, DEFAULT_CALLSIGN,
    DEFAULT_OPERATOR_NAME, DEFAULT_PROTOCOL_CONFIG, DEFAULT_UNIT, ENDING_COMPLETION_THRESHOLD,
    ENDING_PROGRESS_STEP, ENDING_REVEAL_DELAY_MS, ENDING_TICK_INTERVAL_MS,
};

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("ending progress step {step} exceeds completion threshold {threshold}")]
    StepExceedsThreshold { step: u8, threshold: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub operator: OperatorProfile,
    #[serde(default)]
    pub briefing: BriefingConfig,
    #[serde(default)]
    pub ending: EndingTiming,
}

impl EngineConfig {
    /// Parse engine configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the embedded configuration, falling back to built-in defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_PROTOCOL_CONFIG).unwrap_or_default()
    }

    /// Check the invariants the session and ending sequence rely on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator.name.trim().is_empty() {
            return Err(ConfigError::Blank {
                field: "operator.name",
            });
        }
        self.briefing.validate()?;
        self.ending.validate()
    }
}

/// Who the campaign is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorProfile {
    #[serde(default = "OperatorProfile::default_name")]
    pub name: String,
    #[serde(default = "OperatorProfile::default_callsign")]
    pub callsign: String,
    #[serde(default = "OperatorProfile::default_unit")]
    pub unit: String,
}

impl OperatorProfile {
    fn default_name() -> String {
        DEFAULT_OPERATOR_NAME.to_string()
    }

    fn default_callsign() -> String {
        DEFAULT_CALLSIGN.to_string()
    }

    fn default_unit() -> String {
        DEFAULT_UNIT.to_string()
    }
}

impl Default for OperatorProfile {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            callsign: Self::default_callsign(),
            unit: Self::default_unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingConfig {
    #[serde(default = "BriefingConfig::default_timeout_ms")]
    pub timeout_ms: u64,
    /// Used when the provider fails or times out.
    #[serde(default = "BriefingConfig::default_fallback_text")]
    pub fallback_text: String,
    /// Used when the provider answers with blank text.
    #[serde(default = "BriefingConfig::default_empty_response_text")]
    pub empty_response_text: String,
}

impl BriefingConfig {
    const fn default_timeout_ms() -> u64 {
        BRIEFING_TIMEOUT_MS
    }

    fn default_fallback_text() -> String {
        BRIEFING_FALLBACK_TEXT.to_string()
    }

    fn default_empty_response_text() -> String {
        BRIEFING_EMPTY_RESPONSE_TEXT.to_string()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "briefing.timeout_ms",
            });
        }
        if self.fallback_text.trim().is_empty() {
            return Err(ConfigError::Blank {
                field: "briefing.fallback_text",
            });
        }
        if self.empty_response_text.trim().is_empty() {
            return Err(ConfigError::Blank {
                field: "briefing.empty_response_text",
            });
        }
        Ok(())
    }
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            fallback_text: Self::default_fallback_text(),
            empty_response_text: Self::default_empty_response_text(),
        }
    }
}

/// Pacing of the post-campaign ending sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingTiming {
    #[serde(default = "EndingTiming::default_progress_step")]
    pub progress_step: u8,
    #[serde(default = "EndingTiming::default_completion_threshold")]
    pub completion_threshold: u8,
    #[serde(default = "EndingTiming::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "EndingTiming::default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

impl EndingTiming {
    const fn default_progress_step() -> u8 {
        ENDING_PROGRESS_STEP
    }

    const fn default_completion_threshold() -> u8 {
        ENDING_COMPLETION_THRESHOLD
    }

    const fn default_tick_interval_ms() -> u64 {
        ENDING_TICK_INTERVAL_MS
    }

    const fn default_reveal_delay_ms() -> u64 {
        ENDING_REVEAL_DELAY_MS
    }

    /// Timing with no waits, for headless runs.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            progress_step: ENDING_PROGRESS_STEP,
            completion_threshold: ENDING_COMPLETION_THRESHOLD,
            tick_interval_ms: 0,
            reveal_delay_ms: 0,
        }
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_step == 0 {
            return Err(ConfigError::Zero {
                field: "ending.progress_step",
            });
        }
        if self.completion_threshold == 0 {
            return Err(ConfigError::Zero {
                field: "ending.completion_threshold",
            });
        }
        if self.progress_step > self.completion_threshold {
            return Err(ConfigError::StepExceedsThreshold {
                step: self.progress_step,
                threshold: self.completion_threshold,
            });
        }
        Ok(())
    }
}

impl Default for EndingTiming {
    fn default() -> Self {
        Self {
            progress_step: Self::default_progress_step(),
            completion_threshold: Self::default_completion_threshold(),
            tick_interval_ms: Self::default_tick_interval_ms(),
            reveal_delay_ms: Self::default_reveal_delay_ms(),
        }
    }
}
