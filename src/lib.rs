//! DevBot: a question-answering proxy with a near-duplicate answer cache.
//!
//! Questions are normalized and matched against a small JSON store of
//! earlier questions. A near-duplicate (bigram similarity or token overlap
//! above threshold) is answered from the store; anything else goes to an
//! external answer provider and the new pair is written back.
//!
//! ```rust,ignore
//! use devbot::config::Config;
//! use devbot::resolver::AnswerResolver;
//!
//! let config = Config::load()?;
//! let resolver = AnswerResolver::from_config(&config)?;
//! let resolution = resolver.resolve("What is 2+2").await?;
//! println!("{} (cached: {})", resolution.answer, resolution.cached);
//! ```

#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod providers;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use error::{DevbotError, Result};
pub use history::ConversationLog;
pub use providers::AnswerGenerator;
pub use resolver::{normalize_question, AnswerResolver, Resolution, FALLBACK_ANSWER};
pub use store::{QaEntry, QaStore, Store};
