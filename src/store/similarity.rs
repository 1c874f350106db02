//! String and token similarity used to detect near-duplicate questions.
//!
//! Two independent metrics are computed for every candidate:
//!
//! - **bigram similarity**: Sørensen-Dice coefficient over character
//!   bigrams, whitespace ignored, in `[0.0, 1.0]`.
//! - **token overlap**: percentage of the input's word tokens that also
//!   occur in the candidate, in `[0.0, 100.0]`.
//!
//! A candidate is a near-duplicate when *either* metric reaches its
//! threshold.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ResolverConfig;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").unwrap());

/// Split text into word tokens (runs of letters, digits and `_`).
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Dice coefficient over character bigrams, ignoring whitespace.
///
/// Identical strings score `1.0`. Anything shorter than two characters
/// that is not identical scores `0.0`. Bigrams are counted as a multiset,
/// so a repeated bigram only matches as many times as it occurs in both.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut remaining: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *remaining.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = remaining.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    let total = (a.len() - 1) + (b.len() - 1);
    (2 * shared) as f64 / total as f64
}

/// Percentage of `input` tokens present anywhere in `candidate`.
///
/// Repeated input tokens count individually. No input tokens means `0.0`.
pub fn token_overlap(input: &[&str], candidate: &[&str]) -> f64 {
    if input.is_empty() {
        return 0.0;
    }
    let candidate: HashSet<&str> = candidate.iter().copied().collect();
    let common = input.iter().filter(|t| candidate.contains(*t)).count();
    common as f64 / input.len() as f64 * 100.0
}

/// Both similarity metrics for one (input, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    /// Bigram similarity in `[0.0, 1.0]`.
    pub similarity: f64,
    /// Token overlap in `[0.0, 100.0]`.
    pub overlap: f64,
}

impl MatchScore {
    /// Score `candidate` against pre-tokenized `input`.
    pub fn compute(input: &str, input_tokens: &[&str], candidate: &str) -> Self {
        let candidate_tokens = tokenize(candidate);
        Self {
            similarity: bigram_similarity(input, candidate),
            overlap: token_overlap(input_tokens, &candidate_tokens),
        }
    }

    /// Ordering used to choose among qualifying candidates.
    fn outranks(&self, other: &MatchScore) -> bool {
        self.similarity > other.similarity
            || (self.similarity == other.similarity && self.overlap > other.overlap)
    }
}

/// Thresholds that decide whether a score counts as a near-duplicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub similarity_threshold: f64,
    pub token_overlap_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.90,
            token_overlap_threshold: 90.0,
        }
    }
}

impl From<&ResolverConfig> for MatchPolicy {
    fn from(cfg: &ResolverConfig) -> Self {
        Self {
            similarity_threshold: cfg.similarity_threshold,
            token_overlap_threshold: cfg.token_overlap_threshold,
        }
    }
}

impl MatchPolicy {
    pub fn qualifies(&self, score: &MatchScore) -> bool {
        score.similarity >= self.similarity_threshold
            || score.overlap >= self.token_overlap_threshold
    }

    /// True if `challenger` should replace `current` as the best match.
    ///
    /// Strictly better only, so the earliest entry wins a full tie.
    pub(crate) fn prefers(&self, challenger: &MatchScore, current: &MatchScore) -> bool {
        challenger.outranks(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_words() {
        assert_eq!(tokenize("what is 2+2?"), vec!["what", "is", "2", "2"]);
        assert_eq!(tokenize("snake_case ok"), vec!["snake_case", "ok"]);
        assert!(tokenize("  ?! ").is_empty());
    }

    #[test]
    fn test_tokenize_unicode_letters() {
        assert_eq!(tokenize("apa itu café"), vec!["apa", "itu", "café"]);
    }

    #[test]
    fn test_bigram_identical_is_one() {
        assert_eq!(bigram_similarity("what is 2+2", "what is 2+2"), 1.0);
        assert_eq!(bigram_similarity("a", "a"), 1.0);
    }

    #[test]
    fn test_bigram_ignores_whitespace() {
        assert_eq!(bigram_similarity("what is", "whatis"), 1.0);
    }

    #[test]
    fn test_bigram_short_strings_score_zero() {
        assert_eq!(bigram_similarity("a", "b"), 0.0);
        assert_eq!(bigram_similarity("", "ab"), 0.0);
    }

    #[test]
    fn test_bigram_known_values() {
        // {fr, ra, an, nc, ce} vs {fr, re, en, nc, ch}: 2 shared of 10
        assert!((bigram_similarity("france", "french") - 0.4).abs() < 1e-9);
        assert_eq!(bigram_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_bigram_counts_repeats_once_each() {
        // "aaaa" has bigrams {aa, aa, aa}; "aa" has {aa}: 1 shared of 4
        assert!((bigram_similarity("aaaa", "aa") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_token_overlap() {
        let input = tokenize("capital of france");
        let cand = tokenize("what is the capital of france");
        assert_eq!(token_overlap(&input, &cand), 100.0);

        let cand = tokenize("capital of spain");
        assert!((token_overlap(&input, &cand) - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_overlap_empty_input_is_zero() {
        let cand = tokenize("anything");
        assert_eq!(token_overlap(&[], &cand), 0.0);
    }

    #[test]
    fn test_policy_either_metric_qualifies() {
        let policy = MatchPolicy::default();
        assert!(policy.qualifies(&MatchScore {
            similarity: 0.9,
            overlap: 0.0
        }));
        assert!(policy.qualifies(&MatchScore {
            similarity: 0.1,
            overlap: 90.0
        }));
        assert!(!policy.qualifies(&MatchScore {
            similarity: 0.89,
            overlap: 89.9
        }));
    }

    #[test]
    fn test_policy_prefers_similarity_then_overlap() {
        let policy = MatchPolicy::default();
        let a = MatchScore {
            similarity: 0.95,
            overlap: 50.0,
        };
        let b = MatchScore {
            similarity: 0.92,
            overlap: 100.0,
        };
        assert!(policy.prefers(&a, &b));
        assert!(!policy.prefers(&b, &a));

        let c = MatchScore {
            similarity: 0.95,
            overlap: 60.0,
        };
        assert!(policy.prefers(&c, &a));
        assert!(!policy.prefers(&a, &a));
    }

    #[test]
    fn test_policy_from_resolver_config() {
        let cfg = ResolverConfig {
            persist_new_answers: true,
            similarity_threshold: 0.8,
            token_overlap_threshold: 75.0,
        };
        let policy = MatchPolicy::from(&cfg);
        assert_eq!(policy.similarity_threshold, 0.8);
        assert_eq!(policy.token_overlap_threshold, 75.0);
    }
}
