//! Bounded in-memory log of received questions.
//!
//! Kept for inspection only (`GET /api/history`, REPL); it plays no part in
//! answer resolution. Oldest inputs are evicted once `capacity` is reached.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recorded input.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedInput {
    pub input: String,
    pub at: DateTime<Utc>,
}

/// Fixed-capacity ring buffer of recent inputs.
#[derive(Debug)]
pub struct ConversationLog {
    entries: Mutex<VecDeque<LoggedInput>>,
    capacity: usize,
}

impl ConversationLog {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, input: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(LoggedInput {
            input: input.to_string(),
            at: Utc::now(),
        });
    }

    /// Up to `limit` most recent inputs, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<LoggedInput> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recent() {
        let log = ConversationLog::new(10);
        assert!(log.is_empty());
        log.record("first");
        log.record("second");
        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].input, "first");
        assert_eq!(recent[1].input, "second");
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let log = ConversationLog::new(3);
        for i in 0..5 {
            log.record(&format!("q{i}"));
        }
        assert_eq!(log.len(), 3);
        let inputs: Vec<String> = log.recent(3).into_iter().map(|e| e.input).collect();
        assert_eq!(inputs, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_recent_limit_returns_newest() {
        let log = ConversationLog::new(10);
        for i in 0..4 {
            log.record(&format!("q{i}"));
        }
        let inputs: Vec<String> = log.recent(2).into_iter().map(|e| e.input).collect();
        assert_eq!(inputs, vec!["q2", "q3"]);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let log = ConversationLog::new(0);
        assert_eq!(log.capacity(), 1);
        log.record("a");
        log.record("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(1)[0].input, "b");
    }

    #[test]
    fn test_shared_across_tasks() {
        let log = std::sync::Arc::new(ConversationLog::new(100));
        tokio_test::block_on(async {
            let mut handles = Vec::new();
            for i in 0..8 {
                let log = log.clone();
                handles.push(tokio::spawn(async move { log.record(&format!("q{i}")) }));
            }
            for h in handles {
                h.await.unwrap();
            }
        });
        assert_eq!(log.len(), 8);
    }
}
