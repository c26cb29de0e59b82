//! Null score distribution from randomized ranking runs.
//!
//! The table maps gene-set size to the scores observed when the ranking
//! tool is driven with random gene sets of that size. It is loaded once
//! per pipeline run and immutable thereafter.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MorphError, Result};

/// Default name of the score column in the null-distribution CSV.
pub const DEFAULT_SCORE_COLUMN: &str = "AUSR";

/// Empirical null distribution, binned by gene-set size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullDistribution {
    /// Ascending-sorted score samples per set size.
    bins: BTreeMap<u32, Vec<f64>>,
}

impl NullDistribution {
    /// Build a table from (size, score) samples. Bins are sorted ascending.
    pub fn from_samples(samples: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let mut bins: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (size, score) in samples {
            bins.entry(size).or_default().push(score);
        }
        for scores in bins.values_mut() {
            scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        }
        NullDistribution { bins }
    }

    /// Load the table from a CSV file with at least a `size` column and a
    /// score column named `score_column`. A leading unnamed index column
    /// (as written by common data-frame tooling) is tolerated.
    pub fn from_csv(path: &Path, score_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let size_idx = headers
            .iter()
            .position(|h| h == "size")
            .ok_or_else(|| MorphError::NullTable("missing 'size' column".to_string()))?;
        let score_idx = headers.iter().position(|h| h == score_column).ok_or_else(|| {
            MorphError::NullTable(format!("missing score column '{}'", score_column))
        })?;

        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record?;
            let size_field = record.get(size_idx).unwrap_or("");
            let score_field = record.get(score_idx).unwrap_or("");
            let size = parse_size(size_field).ok_or_else(|| {
                MorphError::NullTable(format!("invalid size value {:?}", size_field))
            })?;
            let score: f64 = score_field.trim().parse().map_err(|_| {
                MorphError::NullTable(format!("invalid score value {:?}", score_field))
            })?;
            samples.push((size, score));
        }
        if samples.is_empty() {
            return Err(MorphError::NullTable("table holds no samples".to_string()));
        }
        Ok(Self::from_samples(samples))
    }

    /// Largest sampled set size, if any bin exists.
    pub fn max_size(&self) -> Option<u32> {
        self.bins.keys().next_back().copied()
    }

    /// Number of (size, score) samples in the table.
    pub fn n_samples(&self) -> usize {
        self.bins.values().map(Vec::len).sum()
    }

    /// Right-tail empirical p-value of `observed` for a gene set of `n` genes.
    ///
    /// Sizes beyond the largest sampled bin are clamped down to it — a
    /// pessimistic approximation, since a smaller-set null distribution is
    /// reused for an on-average easier set. Within the ascending bin `L`,
    /// the p-value is `|{s in L : s > observed}| / |L|` (strict `>`: a null
    /// score tied with `observed` does not count as exceeding it). An empty
    /// or absent bin yields 0.0 with a warning.
    pub fn p_value(&self, n: u32, observed: f64) -> f64 {
        let clamped = match self.max_size() {
            Some(max) => n.min(max),
            None => {
                warn!("null-distribution table has no bins");
                return 0.0;
            }
        };
        let scores = match self.bins.get(&clamped) {
            Some(scores) if !scores.is_empty() => scores,
            _ => {
                warn!(size = clamped, "empty null-distribution bin");
                return 0.0;
            }
        };
        match scores.iter().position(|&s| s > observed) {
            Some(i) => (scores.len() - i) as f64 / scores.len() as f64,
            None => 0.0,
        }
    }
}

/// Parse a set size the way loosely typed tabular data stores it: as an
/// integer, or as a float to be truncated.
fn parse_size(field: &str) -> Option<u32> {
    let trimmed = field.trim();
    if let Ok(size) = trimmed.parse::<u32>() {
        return Some(size);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> NullDistribution {
        NullDistribution::from_samples(vec![
            (5, 0.2),
            (5, 0.4),
            (5, 0.6),
            (5, 0.8),
            (10, 0.5),
            (10, 0.9),
        ])
    }

    #[test]
    fn right_tail_counts_strictly_greater() {
        let t = table();
        // Two of four null scores exceed 0.5.
        assert_relative_eq!(t.p_value(5, 0.5), 0.5);
        // A tie does not count as exceeding: only 0.6 and 0.8 remain above 0.4.
        assert_relative_eq!(t.p_value(5, 0.4), 0.5);
        // Nothing exceeds the largest null score.
        assert_relative_eq!(t.p_value(5, 0.8), 0.0);
    }

    #[test]
    fn p_value_in_unit_interval_and_monotone() {
        let t = table();
        let scores = [-1.0, 0.0, 0.3, 0.5, 0.7, 1.0];
        let mut last = f64::INFINITY;
        for &s in &scores {
            let p = t.p_value(5, s);
            assert!((0.0..=1.0).contains(&p));
            assert!(p <= last, "p-value must not increase with the score");
            last = p;
        }
    }

    #[test]
    fn oversized_sets_clamp_to_largest_bin() {
        let t = table();
        assert_relative_eq!(t.p_value(500, 0.6), t.p_value(10, 0.6));
        assert_relative_eq!(t.p_value(500, 0.6), 0.5);
    }

    #[test]
    fn missing_bin_yields_zero() {
        let t = table();
        // Size 7 lies within the sampled range but was never sampled.
        assert_relative_eq!(t.p_value(7, 0.1), 0.0);
    }

    #[test]
    fn from_csv_tolerates_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("null.csv");
        std::fs::write(&path, ",size,AUSR\n0,5,0.2\n1,5,0.8\n2,10,0.5\n").unwrap();
        let t = NullDistribution::from_csv(&path, DEFAULT_SCORE_COLUMN).unwrap();
        assert_eq!(t.max_size(), Some(10));
        assert_eq!(t.n_samples(), 3);
        assert_relative_eq!(t.p_value(5, 0.5), 0.5);
    }

    #[test]
    fn from_csv_rejects_missing_score_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("null.csv");
        std::fs::write(&path, ",size,score\n0,5,0.2\n").unwrap();
        let err = NullDistribution::from_csv(&path, "AUSR").unwrap_err();
        assert!(err.to_string().contains("missing score column"));
    }
}
