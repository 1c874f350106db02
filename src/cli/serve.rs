//! `devbot serve` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use devbot::api::{start_server, AppState};
use devbot::config::Config;
use devbot::history::ConversationLog;
use devbot::resolver::AnswerResolver;

/// Start the HTTP chat server and block until it stops.
pub(crate) async fn cmd_serve(config: Config) -> Result<()> {
    let resolver =
        AnswerResolver::from_config(&config).with_context(|| "Failed to set up answer resolver")?;

    info!(
        store = %config.store.path.display(),
        provider = ?config.provider.kind,
        persist = config.resolver.persist_new_answers,
        "Starting DevBot server"
    );
    if let Some(dir) = &config.server.static_dir {
        if !dir.join("index.html").exists() {
            tracing::warn!(dir = %dir.display(), "Static directory has no index.html");
        }
    }

    let state = AppState::new(
        Arc::new(resolver),
        Arc::new(ConversationLog::new(config.history.capacity)),
    );

    start_server(&config.server, state)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
