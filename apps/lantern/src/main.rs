//! # Lantern - Graph Store Shell
//!
//! The command-line client for the Lantern graph store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/lantern (THE BINARY)                │
//! │                                                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   │
//! │  │    CLI      │   │    Shell     │   │ RemoteStore  │   │
//! │  │   (clap)    │   │ (rustyline)  │   │  (reqwest)   │   │
//! │  └──────┬──────┘   └──────┬───────┘   └──────┬───────┘   │
//! │         └─────────────────┼──────────────────┘           │
//! │                           ▼                              │
//! │                  ┌─────────────────┐                     │
//! │                  │  lantern-core   │                     │
//! │                  │ (THE LANGUAGE)  │                     │
//! │                  └─────────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Interactive shell against a remote store
//! lantern --host 10.0.0.5 --port 6380
//!
//! # One-shot command
//! lantern get vertex alice
//!
//! # Offline session over a volatile store
//! echo "put vertex alice 42" | lantern --memory
//! ```

use clap::Parser;
use lantern::cli::{self, Cli};
use lantern::{Config, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Config errors are reported before logging exists.
    let config = match Config::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lantern: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format, cli.default_filter());

    match cli::execute(cli, config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Install the subscriber. Logs go to stderr; stdout carries command output.
fn init_tracing(format: LogFormat, default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
