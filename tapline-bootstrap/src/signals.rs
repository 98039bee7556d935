// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! OS signal handling. Waits for whichever termination signal the host
//! platform delivers and returns control to the caller, which is expected
//! to drive a [`crate::shutdown::ShutdownCoordinator`] from there.

#[cfg(unix)]
pub async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "received shutdown signal"),
        _ = sigint.recv() => tracing::info!(signal = "SIGINT", "received shutdown signal"),
        _ = sighup.recv() => tracing::info!(signal = "SIGHUP", "received shutdown signal"),
    }
}

#[cfg(windows)]
pub async fn wait_for_shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install Ctrl-C handler");
    tracing::info!(signal = "CTRL_C", "received shutdown signal");
}
