mod delimited;
mod exchange;
mod uls;

pub use delimited::{DelimitedParser, ParsedLine, ParserStyle};
pub use exchange::exchange_parser;
pub use uls::uls_parser;
