//! Answer store inspection commands.

use anyhow::Result;

use devbot::config::Config;
use devbot::resolver::normalize_question;
use devbot::store::{MatchPolicy, QaStore};

use super::StoreAction;

/// Longest answer preview printed by `store list`.
const PREVIEW_CHARS: usize = 60;

pub(crate) fn cmd_store(config: &Config, action: StoreAction) -> Result<()> {
    let store = QaStore::new(config.store.path.clone());

    match action {
        StoreAction::List { limit } => {
            let snapshot = store.load();
            if snapshot.is_empty() {
                println!("No stored answers in {}.", store.path().display());
                return Ok(());
            }

            let shown = snapshot.len().min(limit);
            println!("Showing {} of {} entr(y/ies):", shown, snapshot.len());
            for (i, entry) in snapshot.entries().iter().take(limit).enumerate() {
                println!("{:>4}. {} -> {}", i, entry.question, preview(&entry.answer));
            }
        }
        StoreAction::Stats => {
            let stats = store.stats();
            println!("Store: {}", store.path().display());
            println!("Entries: {}", stats.total_entries);
            println!("Duplicate questions: {}", stats.duplicate_questions);
            println!("File size: {} bytes", stats.file_bytes);
        }
        StoreAction::Find { question } => {
            let question = normalize_question(&question.join(" "));
            if question.is_empty() {
                anyhow::bail!("Question must not be empty");
            }
            let policy = MatchPolicy::from(&config.resolver);
            let snapshot = store.load();
            match snapshot.find_match(&question, &policy) {
                Some(found) => {
                    println!("Match #{}: {}", found.index, found.entry.question);
                    println!(
                        "Similarity: {:.3}  Token overlap: {:.1}%",
                        found.score.similarity, found.score.overlap
                    );
                    println!("Answer: {}", found.entry.answer);
                }
                None => println!("No stored question matches '{}'.", question),
            }
        }
    }

    Ok(())
}

fn preview(answer: &str) -> String {
    let single_line = answer.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > PREVIEW_CHARS {
        let cut: String = single_line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_collapses_whitespace() {
        assert_eq!(preview("line one\n\nline   two"), "line one line two");
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(40);
        let out = preview(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 3);
    }
}
