use super::delimited::{DelimitedParser, ParserStyle};

/// SharePoint ULS logs: tab-separated, no comment lines, columns named by
/// the file's first row (spec §4.7).
pub fn uls_parser(explicit_timestamp_field: Option<String>) -> DelimitedParser {
    DelimitedParser::new('\t', ParserStyle::FirstLineHeader, explicit_timestamp_field)
}
