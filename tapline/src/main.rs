// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Binary entry point: parse and validate CLI arguments, install logging,
//! load configuration, then run (or merely validate) the agent until a
//! shutdown signal arrives.

use std::time::Duration;

use tapline_bootstrap::shutdown::ShutdownCoordinator;
use tapline_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCommand};
use tracing_subscriber::EnvFilter;

use tapline::config::AgentConfig;

fn install_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> anyhow::Result<()> {
    let cli = bootstrap_cli()?;
    install_logging(cli.verbose);

    match cli.command {
        ValidatedCommand::Validate { config } => {
            AgentConfig::load(&config)?;
            tracing::info!(path = %config.display(), "configuration is valid");
            Ok(())
        }
        ValidatedCommand::Start { config } => {
            let path = config.unwrap_or_else(tapline::config::resolve_config_path);
            let agent_config = AgentConfig::load(&path)?;
            let manager = tapline::build_lifecycle_manager(&agent_config)?;

            let shutdown = ShutdownCoordinator::new(Duration::from_secs(30));
            manager.start().await;
            tracing::info!("tapline-agent started");

            tapline_bootstrap::signals::wait_for_shutdown_signal().await;
            shutdown.initiate_shutdown();

            manager.stop().await;
            shutdown.complete_shutdown();
            tracing::info!("tapline-agent stopped");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let result = run().await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "agent exited with an error");
    }
    result_to_exit_code(result)
}
