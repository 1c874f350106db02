//! GET relay provider.
//!
//! Sends `GET {base_url}/{persona + " " + question}` with the prompt
//! percent-encoded as one path segment, and reads the answer from the
//! `text` field of the JSON reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::{ProviderConfig, DEFAULT_RELAY_BASE_URL};
use crate::error::{DevbotError, Result};

use super::{build_client, status_error, AnswerGenerator};

#[derive(Debug, Deserialize)]
struct RelayReply {
    text: Option<String>,
}

/// Provider for relay endpoints that take the prompt in the URL path.
pub struct RelayProvider {
    base_url: Url,
    persona: String,
    client: Client,
}

impl std::fmt::Debug for RelayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayProvider")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl RelayProvider {
    pub fn new(base_url: &str, persona: &str, timeout_secs: u64) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DevbotError::Config(format!("Invalid relay base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DevbotError::Config(format!(
                "Relay base URL '{}' cannot take path segments",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            persona: persona.trim().to_string(),
            client: build_client(timeout_secs)?,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_RELAY_BASE_URL);
        Self::new(base, &config.persona_prompt, config.timeout_secs)
    }

    /// Persona prefix followed by the question.
    pub fn prompt(&self, question: &str) -> String {
        if self.persona.is_empty() {
            question.to_string()
        } else {
            format!("{} {}", self.persona, question)
        }
    }

    /// Full request URL for `question`.
    pub fn request_url(&self, question: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.prompt(question));
        }
        url
    }
}

#[async_trait]
impl AnswerGenerator for RelayProvider {
    async fn generate(&self, question: &str) -> Result<String> {
        let url = self.request_url(question);
        debug!(host = url.host_str().unwrap_or_default(), "Relay request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DevbotError::Generation(format!("Relay request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.name(), status.as_u16(), &body));
        }

        let reply: RelayReply = response
            .json()
            .await
            .map_err(|e| DevbotError::Generation(format!("Failed to parse relay response: {}", e)))?;

        match reply.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(DevbotError::Generation(
                "Relay response had no text".into(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str, persona: &str) -> RelayProvider {
        RelayProvider::new(base, persona, 5).unwrap()
    }

    #[test]
    fn test_prompt_prefixes_persona() {
        let p = provider("https://relay.test/api", "Be brief.");
        assert_eq!(p.prompt("what is rust"), "Be brief. what is rust");
    }

    #[test]
    fn test_prompt_without_persona() {
        let p = provider("https://relay.test/api", "  ");
        assert_eq!(p.prompt("what is rust"), "what is rust");
    }

    #[test]
    fn test_request_url_encodes_prompt_as_one_segment() {
        let p = provider("https://relay.test/api/gemini", "");
        let url = p.request_url("what is 2+2/3?");
        assert_eq!(url.as_str(), "https://relay.test/api/gemini/what%20is%202+2%2F3%3F");
    }

    #[test]
    fn test_request_url_handles_trailing_slash() {
        let p = provider("https://relay.test/api/", "");
        let url = p.request_url("hi");
        assert_eq!(url.as_str(), "https://relay.test/api/hi");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            RelayProvider::new("not a url", "", 5),
            Err(DevbotError::Config(_))
        ));
        assert!(matches!(
            RelayProvider::new("mailto:bot@example.com", "", 5),
            Err(DevbotError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_uses_default_base() {
        let p = RelayProvider::from_config(&ProviderConfig::default()).unwrap();
        assert!(p
            .request_url("x")
            .as_str()
            .starts_with(DEFAULT_RELAY_BASE_URL));
    }

    #[test]
    fn test_reply_parsing() {
        let reply: RelayReply = serde_json::from_str(r#"{"text": "Paris", "status": 200}"#).unwrap();
        assert_eq!(reply.text.as_deref(), Some("Paris"));
        let reply: RelayReply = serde_json::from_str(r#"{"status": 500}"#).unwrap();
        assert!(reply.text.is_none());
    }
}
