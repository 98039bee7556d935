// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Maps agent errors to Unix `sysexits.h`-style process exit codes so a
//! supervisor (systemd, a Windows service manager, a shell script) can tell
//! "fix your config" apart from "the network was down" without parsing log
//! output.

use tapline_domain::error::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,
    /// EX_CONFIG: configuration or credentials are unusable.
    Config = 78,
    /// EX_UNAVAILABLE: a dependency never became available / fatal transport.
    Unavailable = 69,
    /// EX_SOFTWARE: an internal error that should never happen in practice.
    Software = 70,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &AgentError) -> ExitCode {
    match error {
        AgentError::Configuration(_) | AgentError::CredentialsNotFound { .. } => ExitCode::Config,
        AgentError::DependencyUnavailable(_) | AgentError::FatalTransport(_) | AgentError::Timeout(_) => {
            ExitCode::Unavailable
        }
        AgentError::TransientTransport(_) | AgentError::ParseError { .. } | AgentError::ResolutionError(_) => {
            ExitCode::Software
        }
        AgentError::Cancelled | AgentError::Io(_) => ExitCode::Software,
    }
}

pub fn result_to_exit_code(result: anyhow::Result<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => ExitCode::Ok.into(),
        Err(err) => match err.downcast_ref::<AgentError>() {
            Some(agent_err) => map_error_to_exit_code(agent_err).into(),
            None => ExitCode::Software.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_map_to_config_exit_code() {
        let err = AgentError::Configuration("bad toml".to_string());
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Config);
    }

    #[test]
    fn dependency_unavailable_maps_to_unavailable_exit_code() {
        let err = AgentError::DependencyUnavailable("disk".to_string());
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Unavailable);
    }

    #[test]
    fn ok_result_maps_to_the_success_exit_code() {
        let _code: std::process::ExitCode = result_to_exit_code(Ok(()));
    }
}
