//! Cache-first answer resolution.
//!
//! `resolve()` normalizes the question, looks for a near-duplicate in the
//! store, and only on a miss asks the [`AnswerGenerator`]. Successful
//! generations are written back unless `persist_new_answers` is off.
//!
//! Store writes are serialized per resolver: the re-check for a concurrent
//! duplicate and the append happen under one async mutex, so requests served
//! by the same resolver never append the same question twice. Separate
//! processes sharing one store file can still race; duplicates are tolerated.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::config::{Config, ResolverConfig};
use crate::error::{DevbotError, Result};
use crate::providers::{create_generator, AnswerGenerator};
use crate::store::{MatchPolicy, QaStore};

/// Reply used when no answer could be generated.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not find an answer.";

/// Default bound on a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one `resolve()` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub answer: String,
    /// Answer came from the store; no provider call was made.
    pub cached: bool,
    /// This call appended a new entry to the store.
    pub persisted: bool,
}

impl Resolution {
    fn cached(answer: String) -> Self {
        Self {
            answer,
            cached: true,
            persisted: false,
        }
    }

    fn generated(answer: String, persisted: bool) -> Self {
        Self {
            answer,
            cached: false,
            persisted,
        }
    }

    fn fallback() -> Self {
        Self::generated(FALLBACK_ANSWER.to_string(), false)
    }

    /// The answer is backed by the store, either read from or written to it.
    pub fn saved_to_db(&self) -> bool {
        self.cached || self.persisted
    }
}

/// Canonical form used for both matching and storage: NFC, lowercase, trimmed.
pub fn normalize_question(input: &str) -> String {
    input.nfc().collect::<String>().to_lowercase().trim().to_string()
}

/// Resolves questions against the store, falling back to a provider.
pub struct AnswerResolver {
    store: QaStore,
    generator: Arc<dyn AnswerGenerator>,
    policy: MatchPolicy,
    persist_new_answers: bool,
    generation_timeout: Duration,
    write_lock: Mutex<()>,
}

impl AnswerResolver {
    pub fn new(store: QaStore, generator: Arc<dyn AnswerGenerator>, config: &ResolverConfig) -> Self {
        Self {
            store,
            generator,
            policy: MatchPolicy::from(config),
            persist_new_answers: config.persist_new_answers,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            write_lock: Mutex::new(()),
        }
    }

    /// Build the store, provider and resolver described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = create_generator(&config.provider)?;
        let store = QaStore::new(config.store.path.clone());
        Ok(Self::new(store, generator, &config.resolver)
            .with_generation_timeout(Duration::from_secs(config.provider.timeout_secs)))
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn store(&self) -> &QaStore {
        &self.store
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn persist_new_answers(&self) -> bool {
        self.persist_new_answers
    }

    /// Answer `input`, from the store when possible.
    ///
    /// Only fails with [`DevbotError::InvalidInput`] for blank input; provider
    /// and store-write failures degrade to the fallback answer or to an
    /// unpersisted answer respectively.
    pub async fn resolve(&self, input: &str) -> Result<Resolution> {
        let question = normalize_question(input);
        if question.is_empty() {
            return Err(DevbotError::InvalidInput("question must not be empty".into()));
        }

        let store = self.store.load();
        if let Some(hit) = store.find_match(&question, &self.policy) {
            info!(
                index = hit.index,
                similarity = hit.score.similarity,
                overlap = hit.score.overlap,
                "Answer served from store"
            );
            return Ok(Resolution::cached(hit.entry.answer.clone()));
        }

        debug!(provider = self.generator.name(), "Store miss, generating answer");
        let answer = match self.generate(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(provider = self.generator.name(), "Answer generation failed: {}", e);
                return Ok(Resolution::fallback());
            }
        };

        if !self.persist_new_answers {
            return Ok(Resolution::generated(answer, false));
        }

        let persisted = self.write_back(&question, &answer).await;
        Ok(Resolution::generated(answer, persisted))
    }

    async fn generate(&self, question: &str) -> Result<String> {
        let answer = tokio::time::timeout(self.generation_timeout, self.generator.generate(question))
            .await
            .map_err(|_| DevbotError::Timeout(self.generation_timeout.as_secs()))??;
        if answer.trim().is_empty() {
            return Err(DevbotError::Generation("provider returned an empty answer".into()));
        }
        Ok(answer)
    }

    /// Append unless an equivalent question was stored meanwhile.
    async fn write_back(&self, question: &str, answer: &str) -> bool {
        let _guard = self.write_lock.lock().await;

        let current = self.store.load();
        if let Some(existing) = current.find_match(question, &self.policy) {
            debug!(
                index = existing.index,
                "Equivalent question stored by a concurrent request, skipping write"
            );
            return false;
        }

        match self.store.append(question, answer) {
            Ok(()) => {
                info!(entries = current.len() + 1, "Stored new answer");
                true
            }
            Err(e) => {
                error!(path = %self.store.path().display(), "Failed to store answer: {}", e);
                false
            }
        }
    }
}
