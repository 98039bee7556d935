use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entities::delimited_log_context::DelimitedLogContext;
use crate::error::{AgentError, AgentResult};

/// A parsed log record. Exchange, ULS and generic delimited records are all
/// modeled as the same concrete type parameterized by the source-specific
/// comment/header sentinels (spec §4.7); `timestamp()` is the one piece of
/// behavior every specialization must provide.
pub trait Record {
    fn timestamp(&self) -> AgentResult<DateTime<Utc>>;
}

/// A single parsed row of a delimited log file plus the shared header
/// context needed to interpret it (spec §3, §4.7).
#[derive(Debug, Clone)]
pub struct DelimitedRecord {
    context: Arc<DelimitedLogContext>,
    cells: Vec<String>,
}

impl DelimitedRecord {
    pub fn new(context: Arc<DelimitedLogContext>, cells: Vec<String>) -> Self {
        Self { context, cells }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.context
            .column_of(name)
            .and_then(|idx| self.cells.get(idx))
            .map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

impl Record for DelimitedRecord {
    fn timestamp(&self) -> AgentResult<DateTime<Utc>> {
        let field_name = self.context.timestamp_field()?;
        let raw = self.field(&field_name).ok_or_else(|| AgentError::ParseError {
            source_path: String::new(),
            line: 0,
            message: format!("timestamp field '{field_name}' missing from row"),
        })?;
        parse_round_trip_timestamp(raw).ok_or_else(|| AgentError::ParseError {
            source_path: String::new(),
            line: 0,
            message: format!("could not parse timestamp '{raw}'"),
        })
    }
}

/// Round-trip-kind parse (spec §4.7): accepts RFC 3339 first, then the
/// space-separated `YYYY-MM-DD HH:MM:SS` shape IIS/Exchange/ULS logs use.
fn parse_round_trip_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    None
}
