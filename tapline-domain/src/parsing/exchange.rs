use super::delimited::{DelimitedParser, ParserStyle};

/// Exchange message tracking logs: W3C extended format, space-separated,
/// columns named by a `#Fields: ` directive line (spec §4.7).
pub fn exchange_parser(explicit_timestamp_field: Option<String>) -> DelimitedParser {
    DelimitedParser::new(
        ' ',
        ParserStyle::W3cExtended {
            comment_prefix: '#',
            header_sentinel: "#Fields: ".to_string(),
            extra_comment_prefix: Some("Date".to_string()),
        },
        explicit_timestamp_field,
    )
}
