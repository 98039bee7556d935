// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Profile-file-backed credentials (spec §4.4). Modeled as a lazy refresh
//! inside the accessor rather than a dedicated background thread (spec §9):
//! `credentials()` only re-reads the file once the cached state has expired.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use tapline_domain::entities::{Credentials, CredentialsRefreshState};
use tapline_domain::error::{AgentError, AgentResult};

pub struct ProfileCredentialsProvider {
    profile: String,
    filepath: PathBuf,
    refresh_interval: Duration,
    warning_interval: Duration,
    cached: Mutex<Option<CredentialsRefreshState>>,
}

impl ProfileCredentialsProvider {
    pub fn new(
        profile: impl Into<String>,
        filepath: PathBuf,
        refresh_interval: Duration,
        warning_interval: Duration,
    ) -> AgentResult<Self> {
        if !filepath.exists() {
            return Err(AgentError::CredentialsNotFound {
                path: filepath.to_string_lossy().into_owned(),
            });
        }
        Ok(Self {
            profile: profile.into(),
            filepath,
            refresh_interval,
            warning_interval,
            cached: Mutex::new(None),
        })
    }

    /// Returns cached credentials, refreshing from disk first if the cached
    /// state has expired or nothing has been loaded yet.
    pub fn credentials(&self) -> AgentResult<Credentials> {
        let mut cached = self.cached.lock();
        let now = Utc::now();
        let needs_refresh = cached.as_ref().map(|state| state.is_expired(now)).unwrap_or(true);

        if !needs_refresh {
            return Ok(cached.as_ref().expect("just checked").credentials.clone());
        }

        if self.is_stale()? {
            tracing::warn!(profile = %self.profile, path = %self.filepath.display(), "credentials file has not been updated recently");
        }

        let creds = read_profile(&self.filepath, &self.profile)?;
        *cached = Some(CredentialsRefreshState::new(creds.clone(), now, self.refresh_interval));
        Ok(creds)
    }

    /// True when `warninginterval` is enabled and the file's mtime is older
    /// than it.
    pub fn is_stale(&self) -> AgentResult<bool> {
        if self.warning_interval.is_zero() {
            return Ok(false);
        }
        let modified = std::fs::metadata(&self.filepath)?.modified()?;
        let age = modified.elapsed().unwrap_or_default();
        Ok(age > self.warning_interval)
    }
}

fn read_profile(path: &Path, profile: &str) -> AgentResult<Credentials> {
    let contents = std::fs::read_to_string(path)?;
    let header = format!("[{profile}]");
    let mut in_section = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().to_string();
            match key {
                "aws_access_key_id" => access_key_id = Some(value),
                "aws_secret_access_key" => secret_access_key = Some(value),
                "aws_session_token" => session_token = Some(value),
                _ => {}
            }
        }
    }

    let access_key_id = access_key_id.ok_or_else(|| {
        AgentError::Configuration(format!("profile '{profile}' in {} has no aws_access_key_id", path.display()))
    })?;
    let secret_access_key = secret_access_key.ok_or_else(|| {
        AgentError::Configuration(format!(
            "profile '{profile}' in {} has no aws_secret_access_key",
            path.display()
        ))
    })?;

    Ok(Credentials {
        access_key_id,
        secret_access_key,
        session_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_credentials_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_file_fails_construction_with_credentials_not_found() {
        let result = ProfileCredentialsProvider::new(
            "default",
            PathBuf::from("/nonexistent/credentials"),
            Duration::from_secs(300),
            Duration::ZERO,
        );
        assert!(matches!(result, Err(AgentError::CredentialsNotFound { .. })));
    }

    #[test]
    fn reads_the_named_profile_section() {
        let file = write_credentials_file(
            "[default]\naws_access_key_id = AKIA_DEFAULT\naws_secret_access_key = secret_default\n\n[other]\naws_access_key_id = AKIA_OTHER\naws_secret_access_key = secret_other\n",
        );
        let provider = ProfileCredentialsProvider::new(
            "other",
            file.path().to_path_buf(),
            Duration::from_secs(300),
            Duration::ZERO,
        )
        .unwrap();
        let creds = provider.credentials().unwrap();
        assert_eq!(creds.access_key_id, "AKIA_OTHER");
    }

    #[test]
    fn stale_file_is_reported_when_warning_interval_is_enabled() {
        let file = write_credentials_file("[default]\naws_access_key_id = a\naws_secret_access_key = b\n");
        let provider = ProfileCredentialsProvider::new(
            "default",
            file.path().to_path_buf(),
            Duration::from_secs(300),
            Duration::from_millis(1),
        )
        .unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert!(provider.is_stale().unwrap());
    }

    #[test]
    fn disabled_warning_interval_never_reports_stale() {
        let file = write_credentials_file("[default]\naws_access_key_id = a\naws_secret_access_key = b\n");
        let provider =
            ProfileCredentialsProvider::new("default", file.path().to_path_buf(), Duration::from_secs(300), Duration::ZERO)
                .unwrap();
        assert!(!provider.is_stale().unwrap());
    }
}
