//! Mission briefing generation behind a pluggable async provider
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BriefingConfig;
use crate::constants::BRIEFING_FALLBACK_TEXT;

/// Failures a provider may report. [`fetch_briefing`] absorbs all of them.
#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("briefing provider is not configured: {0}")]
    NotConfigured(String),
    #[error("briefing request failed: {0}")]
    Transport(String),
    #[error("briefing provider answered with status {status}")]
    Status { status: u16 },
    #[error("malformed briefing response: {0}")]
    Malformed(String),
}

/// Identifies one briefing request. Only the session's pending ticket is
/// accepted on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BriefingTicket {
    pub generation: u64,
    pub sequence: u64,
    pub mission_index: usize,
}

/// Issued each time the session enters `MISSION_LOADING`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingRequest {
    pub ticket: BriefingTicket,
    pub mission_title: String,
    pub operator_name: String,
}

#[async_trait]
pub trait BriefingProvider: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Produce briefing text for a mission.
    ///
    /// # Errors
    ///
    /// Returns a [`BriefingError`] when the provider cannot produce text.
    async fn generate(
        &self,
        mission_title: &str,
        operator_name: &str,
    ) -> Result<String, BriefingError>;
}

/// Offline provider that always answers with the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBriefing {
    text: String,
}

impl StaticBriefing {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Answer with the configured fallback line.
    #[must_use]
    pub fn from_config(config: &BriefingConfig) -> Self {
        Self::new(config.fallback_text.clone())
    }
}

impl Default for StaticBriefing {
    fn default() -> Self {
        Self::new(BRIEFING_FALLBACK_TEXT)
    }
}

#[async_trait]
impl BriefingProvider for StaticBriefing {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn generate(
        &self,
        _mission_title: &str,
        _operator_name: &str,
    ) -> Result<String, BriefingError> {
        Ok(self.text.clone())
    }
}

/// The prompt remote providers send for a mission.
#[must_use]
pub fn briefing_prompt(mission_title: &str, operator_name: &str) -> String {
    format!(
        "You are a high-ranking tactical commander. Write a 2-sentence mission briefing for an \
         elite developer operator named {operator_name}. The mission title is \
         \"{mission_title}\". The tone should be serious, military-style, but include a subtle \
         developer-related joke or technical jargon."
    )
}

/// Ask `provider` for a briefing, bounded by the configured timeout.
///
/// Never fails: blank answers become `empty_response_text`, while errors and
/// timeouts become `fallback_text`.
pub async fn fetch_briefing(
    provider: &dyn BriefingProvider,
    request: &BriefingRequest,
    config: &BriefingConfig,
) -> String {
    let call = provider.generate(&request.mission_title, &request.operator_name);
    match tokio::time::timeout(config.timeout(), call).await {
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                config.empty_response_text.clone()
            } else {
                text.to_string()
            }
        }
        Ok(Err(err)) => {
            log::warn!(
                "{} briefing failed for '{}', using fallback: {err}",
                provider.name(),
                request.mission_title
            );
            config.fallback_text.clone()
        }
        Err(_) => {
            log::warn!(
                "{} briefing timed out after {}ms for '{}', using fallback",
                provider.name(),
                config.timeout_ms,
                request.mission_title
            );
            config.fallback_text.clone()
        }
    }
}
