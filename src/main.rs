//! DevBot command-line entry point.
//!
//! ```bash
//! # HTTP server on :3000 (POST /api/chat)
//! devbot serve --static-dir public
//!
//! # Terminal chat
//! devbot chat
//!
//! # One-shot
//! devbot ask "what is 2+2"
//! ```
//!
//! Environment: `RUST_LOG`, `PORT`, `DEVBOT_STORE_PATH`, `DEVBOT_PROVIDER`,
//! `DEVBOT_PERSIST_NEW_ANSWERS`, `GEMINI_API_KEY`.

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
