//! # Lantern CLI Module
//!
//! Command-line arguments and the choice of shell mode.
//!
//! ## Modes
//!
//! - one-shot: trailing words form a single command line
//! - interactive: stdin is a terminal, rustyline prompt with validation
//! - pipe: stdin is not a terminal, one command per input line

mod repl;

use crate::client::RemoteStore;
use crate::config::{Config, Overrides};
use crate::error::AppError;
use clap::Parser;
use lantern_core::{Dispatcher, GraphStore, MemoryStore};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

pub use repl::{LanternHelper, Outcome, Shell, normalize};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Lantern - graph store shell
///
/// Reads commands such as `get vertex <key>` or
/// `illuminate spt_cost <seed> <step> <k> <tfidf>` and runs them against a
/// Lantern store.
#[derive(Parser, Debug)]
#[command(name = "lantern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Store port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to a TOML config file (default: ./lantern.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use a volatile in-memory store instead of a remote one
    #[arg(short, long)]
    pub memory: bool,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not read or write the history file
    #[arg(long)]
    pub no_history: bool,

    /// Run a single command and exit, e.g. `lantern get vertex alice`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            timeout_secs: self.timeout,
            no_history: self.no_history,
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_filter(&self) -> &'static str {
        if self.verbose {
            "lantern=debug"
        } else if self.quiet {
            "lantern=error"
        } else {
            "lantern=info"
        }
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Build the store and run the selected mode. Returns `false` when a
/// one-shot or piped command failed.
pub async fn execute(cli: Cli, config: Config) -> Result<bool, AppError> {
    if cli.memory {
        tracing::info!("using in-memory store");
        run(&cli, &config, MemoryStore::new()).await
    } else {
        let store = RemoteStore::from_config(&config)?;
        tracing::info!(endpoint = %store.base_url(), "using remote store");
        run(&cli, &config, store).await
    }
}

async fn run<S: GraphStore + 'static>(
    cli: &Cli,
    config: &Config,
    store: S,
) -> Result<bool, AppError> {
    let shell = Shell::new(Dispatcher::new(store));
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    if !cli.command.is_empty() {
        let line = cli.command.join(" ");
        let outcome = shell.run_line(&line, &mut stdout, &mut stderr).await?;
        return Ok(outcome.is_success());
    }

    if io::stdin().is_terminal() {
        shell.interactive(config.history_path()).await?;
        Ok(true)
    } else {
        shell
            .pipe(io::stdin().lock(), &mut stdout, &mut stderr)
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_words_form_one_shot_command() {
        let cli = Cli::parse_from(["lantern", "-m", "put", "vertex", "a", "1", "-5"]);
        assert!(cli.memory);
        assert_eq!(cli.command, ["put", "vertex", "a", "1", "-5"]);
    }

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::parse_from(["lantern", "-H", "db", "-p", "7000", "--no-history"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("db"));
        assert_eq!(overrides.port, Some(7000));
        assert!(overrides.no_history);
        assert!(cli.command.is_empty());
    }

    #[test]
    fn verbosity_selects_filter() {
        let verbose = Cli::parse_from(["lantern", "-v"]);
        let quiet = Cli::parse_from(["lantern", "-q"]);
        assert_eq!(verbose.default_filter(), "lantern=debug");
        assert_eq!(quiet.default_filter(), "lantern=error");
        assert!(Cli::try_parse_from(["lantern", "-v", "-q"]).is_err());
    }
}
