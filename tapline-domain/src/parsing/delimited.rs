use std::sync::Arc;

use crate::entities::{DelimitedLogContext, DelimitedRecord};

/// What a raw line from a delimited log file turned out to be once fed
/// through a parser (spec §4.7): a comment to discard, a header line that
/// just populated the shared context, or a data row.
#[derive(Debug, Clone)]
pub enum ParsedLine {
    Comment,
    Header,
    Data(DelimitedRecord),
}

/// The two header-discovery conventions the supported log formats use.
#[derive(Debug, Clone)]
pub enum ParserStyle {
    /// W3C extended log format: lines starting with `comment_prefix` are
    /// discarded, except one that starts with `header_sentinel`, which
    /// names the columns (IIS, Exchange message tracking logs).
    ///
    /// `extra_comment_prefix` covers format-specific comment lines that
    /// don't start with `comment_prefix` — Exchange message tracking logs
    /// emit a `Date ...` line that is a comment, not data (spec §4.7).
    W3cExtended {
        comment_prefix: char,
        header_sentinel: String,
        extra_comment_prefix: Option<String>,
    },
    /// No comment lines; the very first line fed to the parser names the
    /// columns (SharePoint ULS logs).
    FirstLineHeader,
}

/// Base delimited-log parser shared by the Exchange and ULS specializations
/// (spec §4.7). Owns no file-handle state — callers feed it one line at a
/// time, in order, from wherever the line came from (tail, full read, etc).
pub struct DelimitedParser {
    context: Arc<DelimitedLogContext>,
    style: ParserStyle,
    explicit_timestamp_field: Option<String>,
}

impl DelimitedParser {
    pub fn new(field_separator: char, style: ParserStyle, explicit_timestamp_field: Option<String>) -> Self {
        Self {
            context: Arc::new(DelimitedLogContext::new(field_separator)),
            style,
            explicit_timestamp_field,
        }
    }

    pub fn context(&self) -> Arc<DelimitedLogContext> {
        Arc::clone(&self.context)
    }

    pub fn feed_line(&self, line: &str) -> ParsedLine {
        match &self.style {
            ParserStyle::W3cExtended {
                comment_prefix,
                header_sentinel,
                extra_comment_prefix,
            } => {
                if let Some(rest) = line.strip_prefix(header_sentinel.as_str()) {
                    self.discover_header(rest.split_whitespace().map(str::to_string).collect());
                    return ParsedLine::Header;
                }
                if line.starts_with(*comment_prefix) {
                    return ParsedLine::Comment;
                }
                if let Some(prefix) = extra_comment_prefix {
                    if line.starts_with(prefix.as_str()) {
                        return ParsedLine::Comment;
                    }
                }
                self.parse_data_line(line)
            }
            ParserStyle::FirstLineHeader => {
                if !self.context.is_header_discovered() {
                    self.discover_header(self.split(line));
                    return ParsedLine::Header;
                }
                self.parse_data_line(line)
            }
        }
    }

    fn discover_header(&self, fields: Vec<String>) {
        self.context
            .discover_header(fields, self.explicit_timestamp_field.as_deref());
    }

    fn split(&self, line: &str) -> Vec<String> {
        line.split(self.context.field_separator()).map(str::to_string).collect()
    }

    fn parse_data_line(&self, line: &str) -> ParsedLine {
        if line.trim().is_empty() {
            return ParsedLine::Comment;
        }
        ParsedLine::Data(DelimitedRecord::new(Arc::clone(&self.context), self.split(line)))
    }
}
