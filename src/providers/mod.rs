//! Answer providers consulted on a cache miss.
//!
//! Every provider implements [`AnswerGenerator`]. The resolver treats them
//! as unreliable: any error, timeout or empty answer becomes the fallback
//! reply, never a failed request.

pub mod gemini;
pub mod relay;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{DevbotError, Result};

pub use gemini::GeminiProvider;
pub use relay::RelayProvider;

/// A text-generation service that answers a single question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce an answer for an already-normalized question.
    async fn generate(&self, question: &str) -> Result<String>;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}

/// Build the provider selected by `config.kind`.
pub fn create_generator(config: &ProviderConfig) -> Result<Arc<dyn AnswerGenerator>> {
    match config.kind {
        ProviderKind::Relay => Ok(Arc::new(RelayProvider::from_config(config)?)),
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::from_config(config)?)),
    }
}

/// Map a non-success HTTP status and body to a generation error.
pub(crate) fn status_error(provider: &str, status: u16, body: &str) -> DevbotError {
    let body = body.trim();
    let detail = if body.is_empty() {
        "empty response body".to_string()
    } else if body.chars().count() > 200 {
        format!("{}...", body.chars().take(200).collect::<String>())
    } else {
        body.to_string()
    };
    DevbotError::Generation(format!("{} returned HTTP {}: {}", provider, status, detail))
}

/// Build the shared HTTP client with a request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DevbotError::Config(format!("Failed to build HTTP client: {}", e)))
}
