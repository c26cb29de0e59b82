//! Parsing of MORPH report files.

mod parser;

pub use parser::{parse_report, parse_report_str, Candidate, MorphReport};
