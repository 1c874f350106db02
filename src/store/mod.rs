//! Question/answer store with near-duplicate lookup and JSON persistence.

pub mod qa_store;
pub mod similarity;

pub use qa_store::{Match, QaEntry, QaStore, Store, StoreStats};
pub use similarity::{bigram_similarity, token_overlap, tokenize, MatchPolicy, MatchScore};
