//! Summary and empirical significance analysis of MORPH bulk runs.
//!
//! A bulk run of the MORPH gene-prioritization tool leaves behind one
//! free-text report per queried gene set. This library turns a directory
//! of such reports into structured records, assigns each gene set an
//! empirical p-value from a pre-computed null distribution, applies a
//! Benjamini-Hochberg correction across the batch, and derives a filtered,
//! optionally categorized candidate table from the significant sets.
//!
//! # Overview
//!
//! - **report**: report file parsing (header record + candidate list)
//! - **stats**: null-distribution p-values and multiple testing correction
//! - **classify**: functional categorization of candidate descriptions
//! - **descriptions**: gene / gene-set description lookups
//! - **pipeline**: batch orchestration and CSV table output
//! - **jobs**: YAML boundary documents for the external ranking tool
//!
//! # Example
//!
//! ```no_run
//! use morph_bulk::prelude::*;
//!
//! let mut config = SummaryConfig::new("reports/", "out/", "null.csv");
//! config.fdr_level = 0.1;
//! config.supplementary = true;
//!
//! let totals = Summarizer::new(config).unwrap().run().unwrap();
//! println!("{} significant gene sets", totals.significant_sets);
//! ```

pub mod classify;
pub mod descriptions;
pub mod error;
pub mod jobs;
pub mod pipeline;
pub mod report;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::classify::{Category, Classifier};
    pub use crate::descriptions::load_descriptions;
    pub use crate::error::{MorphError, Result};
    pub use crate::jobs::{JobList, RankerConfig};
    pub use crate::pipeline::{
        ExtendedRow, ParseErrorPolicy, RunTotals, SummaryConfig, SummaryRow, Summarizer,
    };
    pub use crate::report::{parse_report, Candidate, MorphReport};
    pub use crate::stats::{correct_bh, holm, NullDistribution};
}
