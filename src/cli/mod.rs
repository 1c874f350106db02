//! Command-line interface for the `devbot` binary.

pub(crate) mod ask;
pub(crate) mod chat;
#[cfg(feature = "server")]
pub(crate) mod serve;
pub(crate) mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devbot::config::Config;

#[derive(Parser, Debug)]
#[command(name = "devbot")]
#[command(about = "Question-answering chatbot with a near-duplicate answer cache")]
#[command(version)]
pub(crate) struct Cli {
    /// Config file (default: ~/.devbot/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run the HTTP chat server
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Directory with the static front end
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
        /// Do not write new answers to the store
        #[arg(long)]
        no_persist: bool,
    },
    /// Interactive chat in the terminal
    Chat {
        /// Do not write new answers to the store
        #[arg(long)]
        no_persist: bool,
    },
    /// Answer a single question and exit
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect the answer store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum StoreAction {
    /// List stored questions and answers
    List {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
    /// Show which stored entry a question would match, without calling a provider
    Find {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

/// Install the global tracing subscriber.
pub(crate) fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load config from `--config` or the default location.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load().with_context(|| "Failed to load configuration"),
    }
}

/// Parse arguments and run the selected command.
pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve {
            port,
            bind,
            static_dir,
            no_persist,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            if no_persist {
                config.resolver.persist_new_answers = false;
            }
            serve::cmd_serve(config).await
        }
        Commands::Chat { no_persist } => {
            if no_persist {
                config.resolver.persist_new_answers = false;
            }
            chat::cmd_chat(config).await
        }
        Commands::Ask { question, json } => ask::cmd_ask(config, &question.join(" "), json).await,
        Commands::Store { action } => store::cmd_store(&config, action),
    }
}
