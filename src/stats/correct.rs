//! Multiple testing correction across a batch of gene sets.
//!
//! Both procedures deliberately reproduce the original control logic
//! rather than the textbook per-row adjustments: the Benjamini-Hochberg
//! step-up scan fixes a single scaling factor for the whole table, and the
//! Holm step-down scan truncates the row set at its stopping position.
//! They are documented approximations, kept for compatibility with
//! previously published summaries.

use statrs::distribution::{ContinuousCDF, Normal};

/// Benjamini-Hochberg step-up correction at level `alpha`.
///
/// Scanning the p-values in ascending order by 1-indexed rank `k`, the
/// first rank where `(k/m) * alpha < p(k)` fixes the table-wide scaling
/// factor `m/k`; every input p-value is multiplied by it. When no rank
/// triggers (every p-value sits under its threshold) the factor is 1.
///
/// Corrected values are returned in input order, so the result is stable
/// under permutation of the inputs.
pub fn correct_bh(p_values: &[f64], alpha: f64) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = p_values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let m_f64 = m as f64;
    let mut factor = 1.0;
    for (i, &p) in sorted.iter().enumerate() {
        let rank = (i + 1) as f64;
        if (rank / m_f64) * alpha < p {
            factor = m_f64 / rank;
            break;
        }
    }

    p_values.iter().map(|&p| factor * p).collect()
}

/// Holm step-down filter over a score column.
///
/// Each row's p-score is the standard-normal survival function of its
/// score. Rows are sorted ascending by p-score; scanning 0-indexed
/// positions, the first `i` where `alpha / (m + 1 - i) < p_score(i)` stops
/// the scan and all rows before that position are returned. When no
/// position triggers, every row survives.
pub fn holm<T: Clone>(rows: &[T], alpha: f64, score_of: impl Fn(&T) -> f64) -> Vec<T> {
    let m = rows.len();
    if m == 0 {
        return Vec::new();
    }

    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut scored: Vec<(f64, &T)> = rows
        .iter()
        .map(|row| (1.0 - normal.cdf(score_of(row)), row))
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    for (i, (p_score, _)) in scored.iter().enumerate() {
        if alpha / ((m + 1 - i) as f64) < *p_score {
            return scored[..i].iter().map(|(_, row)| (*row).clone()).collect();
        }
    }
    scored.into_iter().map(|(_, row)| row.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bh_scales_every_row_by_one_factor() {
        // m = 4, alpha = 0.1. Thresholds: 0.025, 0.05, 0.075, 0.1.
        // First failing rank is k = 2 (0.06 > 0.05), factor = 4 / 2 = 2.
        let p = vec![0.01, 0.06, 0.2, 0.5];
        let corrected = correct_bh(&p, 0.1);
        assert_relative_eq!(corrected[0], 0.02);
        assert_relative_eq!(corrected[1], 0.12);
        assert_relative_eq!(corrected[2], 0.4);
        assert_relative_eq!(corrected[3], 1.0);
    }

    #[test]
    fn bh_is_stable_under_permutation() {
        let p = vec![0.2, 0.01, 0.5, 0.06];
        let corrected = correct_bh(&p, 0.1);
        // Same rows as in bh_scales_every_row_by_one_factor, permuted.
        assert_relative_eq!(corrected[0], 0.4);
        assert_relative_eq!(corrected[1], 0.02);
        assert_relative_eq!(corrected[2], 1.0);
        assert_relative_eq!(corrected[3], 0.12);
    }

    #[test]
    fn bh_factor_is_one_when_all_ranks_pass() {
        let p = vec![0.001, 0.002, 0.003];
        let corrected = correct_bh(&p, 0.5);
        for (&raw, &adj) in p.iter().zip(&corrected) {
            assert_relative_eq!(raw, adj);
        }
    }

    #[test]
    fn bh_empty_input() {
        assert!(correct_bh(&[], 0.05).is_empty());
    }

    #[test]
    fn holm_truncates_at_first_failing_position() {
        // Scores 3.0 and 2.5 give p-scores ~1.3e-3 and ~6.2e-3; score 0.0
        // gives 0.5, which fails alpha / (m + 1 - i) immediately.
        let rows = vec![3.0_f64, 0.0, 2.5];
        let kept = holm(&rows, 0.05, |s| *s);
        assert_eq!(kept, vec![3.0, 2.5]);
    }

    #[test]
    fn holm_keeps_all_rows_when_none_fail() {
        let rows = vec![5.0_f64, 4.5, 6.0];
        let kept = holm(&rows, 0.05, |s| *s);
        assert_eq!(kept.len(), 3);
        // Returned in ascending p-score order, i.e. descending score.
        assert_eq!(kept, vec![6.0, 5.0, 4.5]);
    }

    #[test]
    fn holm_drops_everything_when_first_position_fails() {
        let rows = vec![0.0_f64, -1.0];
        let kept = holm(&rows, 0.05, |s| *s);
        assert!(kept.is_empty());
    }
}
