//! `devbot ask` — one question, one answer.

use anyhow::{Context, Result};
use serde_json::json;

use devbot::config::Config;
use devbot::resolver::AnswerResolver;

pub(crate) async fn cmd_ask(config: Config, question: &str, as_json: bool) -> Result<()> {
    let resolver =
        AnswerResolver::from_config(&config).with_context(|| "Failed to set up answer resolver")?;

    let resolution = resolver
        .resolve(question)
        .await
        .with_context(|| format!("Could not answer '{}'", question))?;

    if as_json {
        let out = json!({
            "response": resolution.answer,
            "cached": resolution.cached,
            "savedToDb": resolution.saved_to_db(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", resolution.answer);
    }
    Ok(())
}
