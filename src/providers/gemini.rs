//! Native Gemini provider.
//!
//! Calls `generateContent` with the persona as `systemInstruction` and the
//! question as the only user turn. API key comes from config, which already
//! folds in `GEMINI_API_KEY` / `GOOGLE_API_KEY`.
//!
//! Thinking model support: Gemini 2.5 models return parts tagged `thought: true`.
//! Those are filtered out and only the final non-thought text is returned.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{DevbotError, Result};

use super::{build_client, status_error, AnswerGenerator};

/// Gemini v1beta REST API base.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured.
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Gemini provider authenticated with an API key.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    persona: String,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str, persona: &str, timeout_secs: u64) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(DevbotError::Config(
                "Gemini provider needs an API key (provider.api_key or GEMINI_API_KEY)".into(),
            ));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            persona: persona.trim().to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            client: build_client(timeout_secs)?,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let key = config.api_key.as_deref().unwrap_or_default();
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        let mut provider = Self::new(key, model, &config.persona_prompt, config.timeout_secs)?;
        if let Some(base) = config.base_url.as_deref() {
            provider.api_base = base.trim_end_matches('/').to_string();
        }
        Ok(provider)
    }

    pub fn default_model() -> &'static str {
        DEFAULT_GEMINI_MODEL
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for a single question.
    pub fn build_request_body(&self, question: &str) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": question }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 1024
            }
        });
        if !self.persona.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": &self.persona }] });
        }
        body
    }

    /// Extract final answer text from a Gemini API response.
    ///
    /// Parts tagged `"thought": true` are skipped. If only thought parts
    /// exist, their text is returned instead.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();

        if !final_parts.is_empty() {
            return Some(final_parts.join(""));
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();

        if !thought_parts.is_empty() {
            Some(thought_parts.join(""))
        } else {
            None
        }
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl AnswerGenerator for GeminiProvider {
    async fn generate(&self, question: &str) -> Result<String> {
        let body = self.build_request_body(question);

        debug!("Gemini request to model {}", self.model);

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| DevbotError::Generation(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_text);
            return Err(status_error(self.name(), status, &detail));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| DevbotError::Generation(format!("Failed to parse Gemini response: {}", e)))?;

        match Self::extract_text(&json) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(DevbotError::Generation(
                "Gemini response had no text".into(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
