// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! Sits outside the domain/application/infrastructure layers and provides
//! the pieces every binary needs before any of those layers run:
//!
//! - **Entry point glue** - CLI parsing and validation (`cli`)
//! - **Signal handling** - graceful shutdown on SIGTERM/SIGINT/SIGHUP (`signals`)
//! - **Shutdown coordination** - cancellation tokens with a grace period (`shutdown`)
//! - **Bootstrap logging** - a minimal logging trait for the phase before
//!   the full `tracing` subscriber is installed (`logger`)
//! - **Exit codes** - mapping agent errors to Unix exit codes (`exit_code`)

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Parses and validates CLI arguments. The main entry point for the
/// bootstrap layer; `main.rs` calls this before doing anything else.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
