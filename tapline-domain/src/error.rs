// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Error taxonomy shared by every layer of the agent.
//!
//! The variants mirror the propagation policy: component start/stop errors
//! are logged and swallowed by the lifecycle manager, record-parsing errors
//! are logged and skipped per record, transport errors feed the throttle,
//! and configuration errors are fatal at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("credentials not found at {path}")]
    CredentialsNotFound { path: String },

    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("transient transport error: {0}")]
    TransientTransport(String),

    #[error("fatal transport error: {0}")]
    FatalTransport(String),

    #[error("parse error at {source_path}:{line}: {message}")]
    ParseError {
        source_path: String,
        line: usize,
        message: String,
    },

    #[error("resolution error: {0}")]
    ResolutionError(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
