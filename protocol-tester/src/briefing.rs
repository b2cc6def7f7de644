//! HTTP briefing provider backed by the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use protocol_game::{BriefingError, BriefingProvider, briefing_prompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub struct GeminiBriefing {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiBriefing {
    #[must_use]
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    /// Create a provider from environment variables
    ///
    /// Required: `GEMINI_API_KEY` (or `API_KEY`)
    /// Optional: `GEMINI_MODEL`, `GEMINI_API_URL`
    ///
    /// # Errors
    ///
    /// Returns [`BriefingError::NotConfigured`] when no key is set.
    pub fn from_env() -> Result<Self, BriefingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`BriefingError::NotConfigured`] when no key is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BriefingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or_else(|| BriefingError::NotConfigured("GEMINI_API_KEY not set".into()))?;
        let api_url = non_blank("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let model = non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        Ok(Self::new(api_key, api_url, model))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for GeminiBriefing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBriefing")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BriefingProvider for GeminiBriefing {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        mission_title: &str,
        operator_name: &str,
    ) -> Result<String, BriefingError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: briefing_prompt(mission_title, operator_name),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BriefingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefingError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BriefingError::Transport(e.to_string()))?;
        parse_response(&body)
    }
}

/// First candidate's first text part; empty when the model returned none.
fn parse_response(body: &str) -> Result<String, BriefingError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| BriefingError::Malformed(e.to_string()))?;
    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .unwrap_or_default())
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = GeminiBriefing::from_lookup(lookup(&[("GEMINI_MODEL", "x")])).unwrap_err();
        assert!(matches!(err, BriefingError::NotConfigured(_)));

        let blank = GeminiBriefing::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn api_key_alias_and_defaults() {
        let provider = GeminiBriefing::from_lookup(lookup(&[("API_KEY", "k")])).unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn overrides_are_honoured() {
        let provider = GeminiBriefing::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "custom"),
            ("GEMINI_API_URL", "http://localhost:9/v1/"),
        ]))
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9/v1/models/custom:generateContent"
        );
        assert!(!format!("{provider:?}").contains("\"k\""));
    }

    #[test]
    fn parses_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Move out, Neo."}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Move out, Neo.");
    }

    #[test]
    fn missing_text_is_empty_and_garbage_is_malformed() {
        assert_eq!(parse_response(r#"{"candidates":[]}"#).unwrap(), "");
        assert_eq!(parse_response("{}").unwrap(), "");
        assert_eq!(
            parse_response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap(),
            ""
        );
        assert!(matches!(
            parse_response("<html>"),
            Err(BriefingError::Malformed(_))
        ));
    }
}
