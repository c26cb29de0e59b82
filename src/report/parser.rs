//! Parser for single MORPH report files.
//!
//! A report is two blocks separated by a blank line. The header block is
//! newline-separated labelled fields:
//!
//! ```text
//! Best AUSR: 1.23
//! Average AUSR: 0.98
//! Gene expression data set: dataset1
//! Clustering: click
//! Genes of interest present in data set: AT1 AT2 AT3
//! Genes of interest missing in data set: AT4
//! ```
//!
//! The body block is tab-separated: a section title and a column header
//! (both discarded), then one candidate per line with at least rank, gene
//! symbol, score and a free-text description. Gene lists in the header end
//! with a trailing space, so the last (empty) token of each list is sliced
//! off rather than trimmed.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// Parsed per-gene-set result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphReport {
    /// Gene-set identifier, derived from the file name (`:` normalized to `_`).
    pub group: String,
    /// Reported aggregate score for the gene set.
    pub ausr: f64,
    /// Bait genes found in the expression data (upper-cased).
    pub genes_in_data: BTreeSet<String>,
    /// Bait genes absent from the expression data (upper-cased).
    pub genes_missing: BTreeSet<String>,
}

/// One candidate gene returned by the ranking tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Upper-cased gene symbol.
    pub gene: String,
    /// Rank within the report, 1-based and strictly increasing.
    pub rank: u32,
    /// Candidate score.
    pub score: f64,
    /// Free-text description, possibly overridden by an external lookup.
    pub description: String,
}

/// Parse one report file.
///
/// When `gene_descriptions` is supplied, a candidate whose upper-cased
/// symbol is present as a key has its embedded description replaced by the
/// lookup value; other candidates keep the in-report text.
pub fn parse_report(
    path: &Path,
    gene_descriptions: Option<&HashMap<String, String>>,
) -> Result<(MorphReport, Vec<Candidate>)> {
    let content = std::fs::read_to_string(path)?;
    parse_report_str(path, &content, gene_descriptions)
}

/// Parse report `content` originating from `path`.
///
/// `path` is used for the group identifier and for error diagnostics only.
pub fn parse_report_str(
    path: &Path,
    content: &str,
    gene_descriptions: Option<&HashMap<String, String>>,
) -> Result<(MorphReport, Vec<Candidate>)> {
    let group = group_from_path(path)?;

    let blocks: Vec<&str> = content.split("\n\n").collect();
    if blocks.len() < 2 {
        return Err(MorphError::report(
            path,
            "missing blank-line separator between header and candidate blocks",
        ));
    }
    let header: Vec<&str> = blocks[0].split('\n').collect();

    let ausr_field = field_value(&header, 0, path, "score")?;
    let ausr: f64 = ausr_field.trim().parse().map_err(|_| {
        MorphError::report(path, format!("malformed score value {:?}", ausr_field))
    })?;
    if !ausr.is_finite() {
        return Err(MorphError::report(
            path,
            format!("non-finite score value {:?}", ausr_field),
        ));
    }

    let genes_in_data = gene_list(field_value(&header, 4, path, "present-gene list")?);
    let genes_missing = if header.len() > 5 {
        gene_list(field_value(&header, 5, path, "missing-gene list")?)
    } else {
        BTreeSet::new()
    };

    // Body: drop the trailing empty line, then the section title and the
    // column header.
    let mut body: Vec<&str> = blocks[1].split('\n').collect();
    body.pop();

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut by_gene: HashMap<String, usize> = HashMap::new();
    for line in body.iter().skip(2) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            return Err(MorphError::report(
                path,
                format!(
                    "candidate line has {} tab-separated fields, expected at least 4: {:?}",
                    fields.len(),
                    line
                ),
            ));
        }
        let rank: u32 = fields[0].parse().map_err(|_| {
            MorphError::report(path, format!("malformed candidate rank {:?}", fields[0]))
        })?;
        let score: f64 = fields[2].parse().map_err(|_| {
            MorphError::report(path, format!("malformed candidate score {:?}", fields[2]))
        })?;
        let gene = fields[1].to_uppercase();
        let description = match gene_descriptions.and_then(|d| d.get(&gene)) {
            Some(desc) => desc.clone(),
            None => fields[3].to_string(),
        };

        let candidate = Candidate {
            gene: gene.clone(),
            rank,
            score,
            description,
        };
        // A duplicate symbol replaces the earlier entry in place.
        match by_gene.get(&gene) {
            Some(&idx) => candidates[idx] = candidate,
            None => {
                by_gene.insert(gene, candidates.len());
                candidates.push(candidate);
            }
        }
    }

    let report = MorphReport {
        group,
        ausr,
        genes_in_data,
        genes_missing,
    };
    Ok((report, candidates))
}

/// Derive the gene-set identifier from a report file name: the segment
/// after the last `__`, extension stripped, `:` normalized to `_`.
fn group_from_path(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MorphError::report(path, "file name is not valid UTF-8"))?;
    let tail = name.rsplit("__").next().unwrap_or(name);
    let stem = match tail.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => tail,
    };
    let group = stem.replace(':', "_");
    if group.is_empty() {
        return Err(MorphError::report(
            path,
            "empty gene-set identifier in file name",
        ));
    }
    Ok(group)
}

/// Value of the `"<label>: <value>"` header field at `index`.
fn field_value<'a>(
    header: &[&'a str],
    index: usize,
    path: &Path,
    what: &str,
) -> Result<&'a str> {
    let line = header.get(index).ok_or_else(|| {
        MorphError::report(
            path,
            format!(
                "header has {} fields, expected {} at index {}",
                header.len(),
                what,
                index
            ),
        )
    })?;
    let (_, value) = line.split_once(": ").ok_or_else(|| {
        MorphError::report(path, format!("header field {:?} has no ': ' delimiter", line))
    })?;
    Ok(value)
}

/// Split a space-separated gene list, slicing off the spurious empty token
/// produced by the trailing space, and upper-case the symbols.
fn gene_list(value: &str) -> BTreeSet<String> {
    let mut tokens: Vec<&str> = value.split(' ').collect();
    tokens.pop();
    tokens.iter().map(|g| g.to_uppercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    const REPORT: &str = "Best AUSR: 1.23\n\
        Average AUSR: 0.98\n\
        Gene expression data set: dataset1\n\
        Clustering: click\n\
        Genes of interest present in data set: at1 AT2 AT3 \n\
        Genes of interest missing in data set: AT4 \n\
        \n\
        Candidates:\n\
        Rank\tGene ID\tScore\tAnnotation\tGene web page\n\
        1\tat5\t2.50\tprotein kinase 1\thttp://example\n\
        2\tAT6\t0.40\tunknown protein\thttp://example\n";

    fn path(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    #[test]
    fn parses_header_and_candidates() {
        let (report, candidates) =
            parse_report_str(&path("run__set1.txt"), REPORT, None).unwrap();

        assert_eq!(report.group, "set1");
        assert_relative_eq!(report.ausr, 1.23);
        assert_eq!(report.genes_in_data.len(), 3);
        assert!(report.genes_in_data.contains("AT1"));
        assert_eq!(report.genes_missing.len(), 1);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].gene, "AT5");
        assert_eq!(candidates[0].rank, 1);
        assert_relative_eq!(candidates[0].score, 2.5);
        assert_eq!(candidates[0].description, "protein kinase 1");
        assert_eq!(candidates[1].rank, 2);
    }

    #[test]
    fn present_and_missing_genes_are_disjoint() {
        let (report, _) = parse_report_str(&path("run__set1.txt"), REPORT, None).unwrap();
        assert!(report.genes_in_data.is_disjoint(&report.genes_missing));
    }

    #[test]
    fn group_id_is_normalized() {
        let (report, _) =
            parse_report_str(&path("bulk__GO:0006979.txt"), REPORT, None).unwrap();
        assert_eq!(report.group, "GO_0006979");
        assert!(!report.group.contains(':'));
    }

    #[test]
    fn missing_gene_line_is_optional() {
        let content = "Best AUSR: 0.5\n\
            Average AUSR: 0.4\n\
            Gene expression data set: d\n\
            Clustering: c\n\
            Genes of interest present in data set: A B \n\
            \n\
            Candidates:\n\
            Rank\tGene ID\tScore\tAnnotation\n";
        let (report, candidates) =
            parse_report_str(&path("x__s.txt"), content, None).unwrap();
        assert!(report.genes_missing.is_empty());
        assert!(candidates.is_empty());
    }

    #[test]
    fn missing_separator_is_an_error() {
        let err = parse_report_str(&path("x__s.txt"), "Best AUSR: 1.0\n", None)
            .unwrap_err();
        assert!(err.to_string().contains("blank-line separator"));
    }

    #[test]
    fn malformed_score_is_an_error() {
        let content = REPORT.replace("Best AUSR: 1.23", "Best AUSR: n.a.");
        let err = parse_report_str(&path("x__s.txt"), &content, None).unwrap_err();
        assert!(err.to_string().contains("malformed score"));
    }

    #[test]
    fn short_header_is_an_error() {
        let content = "Best AUSR: 1.0\nAverage AUSR: 0.9\n\nCandidates:\nRank\n";
        let err = parse_report_str(&path("x__s.txt"), content, None).unwrap_err();
        assert!(err.to_string().contains("expected present-gene list"));
    }

    #[test]
    fn lookup_overrides_description() {
        let mut lookup = HashMap::new();
        lookup.insert("AT5".to_string(), "curated kinase".to_string());
        let (_, candidates) =
            parse_report_str(&path("run__set1.txt"), REPORT, Some(&lookup)).unwrap();
        assert_eq!(candidates[0].description, "curated kinase");
        // AT6 is absent from the lookup and keeps the in-report text.
        assert_eq!(candidates[1].description, "unknown protein");
    }

    #[test]
    fn duplicate_gene_keeps_last_occurrence() {
        let content = REPORT.replace("2\tAT6\t0.40\tunknown protein", "2\tAT5\t0.40\tsecond entry");
        let (_, candidates) =
            parse_report_str(&path("run__set1.txt"), &content, None).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].rank, 2);
        assert_eq!(candidates[0].description, "second entry");
    }
}
