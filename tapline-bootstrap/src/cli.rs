// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling: parse with `clap`, then validate the
//! arguments that matter before application code ever sees them.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "tapline-agent", about = "Collects records from local sources and forwards them to cloud endpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging regardless of RUST_LOG.
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the agent in the foreground and run until signaled to stop.
    Start {
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file without starting the agent.
    Validate {
        #[arg(long, short = 'c')]
        config: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("argument '{arg}' is invalid: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("config path does not exist: {0}")]
    ConfigNotFound(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Start { config: Option<PathBuf> },
    Validate { config: PathBuf },
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(Cli::parse())
}

fn validate_existing_path(path: &Path) -> Result<(), ParseError> {
    if !path.exists() {
        return Err(ParseError::ConfigNotFound(path.to_path_buf()));
    }
    Ok(())
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let command = match cli.command {
        Commands::Start { config } => {
            if let Some(path) = &config {
                validate_existing_path(path)?;
            }
            ValidatedCommand::Start { config }
        }
        Commands::Validate { config } => {
            validate_existing_path(&config)?;
            ValidatedCommand::Validate { config }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_is_a_parse_error() {
        let cli = Cli {
            command: Commands::Validate {
                config: PathBuf::from("/nonexistent/tapline.toml"),
            },
            verbose: false,
        };
        assert!(matches!(validate_cli(cli), Err(ParseError::ConfigNotFound(_))));
    }

    #[test]
    fn start_with_no_config_path_is_valid() {
        let cli = Cli {
            command: Commands::Start { config: None },
            verbose: true,
        };
        let validated = validate_cli(cli).unwrap();
        assert!(validated.verbose);
        assert!(matches!(validated.command, ValidatedCommand::Start { config: None }));
    }
}
