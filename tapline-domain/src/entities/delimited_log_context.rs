use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{AgentError, AgentResult};

/// Mutable parsing state shared by every record read from one file stream
/// (spec §3). Created once when a file is first opened, mutated exactly
/// once by header discovery, then read concurrently by record constructors
/// — hence the `RwLock` rather than exposing raw mutable fields.
#[derive(Debug)]
pub struct DelimitedLogContext {
    field_separator: char,
    state: RwLock<HeaderState>,
}

#[derive(Debug, Default, Clone)]
struct HeaderState {
    header_fields: Vec<String>,
    mapping: HashMap<String, usize>,
    timestamp_field: Option<String>,
}

impl DelimitedLogContext {
    pub fn new(field_separator: char) -> Self {
        Self {
            field_separator,
            state: RwLock::new(HeaderState::default()),
        }
    }

    pub fn field_separator(&self) -> char {
        self.field_separator
    }

    pub fn is_header_discovered(&self) -> bool {
        !self.state.read().unwrap().header_fields.is_empty()
    }

    /// Sets header fields exactly once. Calling this a second time is a
    /// logic error in the caller (one parser instance per file stream).
    pub fn discover_header(&self, fields: Vec<String>, explicit_timestamp_field: Option<&str>) {
        let mapping = fields
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        let timestamp_field = resolve_timestamp_field(&fields, explicit_timestamp_field);

        let mut state = self.state.write().unwrap();
        state.header_fields = fields;
        state.mapping = mapping;
        state.timestamp_field = timestamp_field;
    }

    pub fn header_fields(&self) -> Vec<String> {
        self.state.read().unwrap().header_fields.clone()
    }

    pub fn column_of(&self, field_name: &str) -> Option<usize> {
        self.state.read().unwrap().mapping.get(field_name).copied()
    }

    /// Timestamp field resolution precedence (spec §4.7): explicit
    /// `TimeStampField` configured on the parser, else a well-known field in
    /// the mapping (`date-time`, then `DateTime`), else a fatal error.
    pub fn timestamp_field(&self) -> AgentResult<String> {
        self.state
            .read()
            .unwrap()
            .timestamp_field
            .clone()
            .ok_or_else(|| AgentError::ParseError {
                source_path: String::new(),
                line: 0,
                message: "cannot determine date-time field".to_string(),
            })
    }
}

fn resolve_timestamp_field(fields: &[String], explicit: Option<&str>) -> Option<String> {
    if let Some(explicit) = explicit {
        if fields.iter().any(|f| f == explicit) {
            return Some(explicit.to_string());
        }
    }
    for candidate in ["date-time", "DateTime"] {
        if let Some(found) = fields.iter().find(|f| f.as_str() == candidate) {
            return Some(found.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_field_wins_over_well_known_names() {
        let ctx = DelimitedLogContext::new('\t');
        ctx.discover_header(
            vec!["date-time".into(), "custom-ts".into()],
            Some("custom-ts"),
        );
        assert_eq!(ctx.timestamp_field().unwrap(), "custom-ts");
    }

    #[test]
    fn falls_back_to_well_known_field() {
        let ctx = DelimitedLogContext::new('\t');
        ctx.discover_header(vec!["foo".into(), "DateTime".into()], None);
        assert_eq!(ctx.timestamp_field().unwrap(), "DateTime");
    }

    #[test]
    fn fatal_error_when_no_timestamp_field_resolvable() {
        let ctx = DelimitedLogContext::new('\t');
        ctx.discover_header(vec!["foo".into(), "bar".into()], None);
        assert!(ctx.timestamp_field().is_err());
    }
}
