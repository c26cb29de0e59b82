//! Batch aggregation pipeline: parse, estimate significance, correct,
//! filter and classify, then emit the summary tables.

mod runner;
mod tables;

pub use runner::{ParseErrorPolicy, RunTotals, SummaryConfig, Summarizer};
pub use tables::{ExtendedRow, SummaryRow};
