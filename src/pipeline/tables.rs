//! Typed table rows and CSV emission.
//!
//! Intermediate results are held as explicitly typed record lists and
//! converted to tabular output in a single final step.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of the per-gene-set summary table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Gene-set identifier.
    pub group: String,
    /// Reported aggregate score.
    pub ausr: f64,
    /// Number of bait genes present in the expression data.
    pub genes_in_data: usize,
    /// Number of bait genes missing from the expression data.
    pub genes_missing: usize,
    /// Number of candidate genes in the report.
    pub candidates: usize,
    /// Gene-set description, when a lookup was supplied.
    pub set_description: Option<String>,
    /// Raw empirical p-value.
    pub p_value: f64,
    /// Benjamini-Hochberg corrected value, filled by the correction pass.
    pub bh_corrected: Option<f64>,
}

/// One row of the extended-annotation table: a surviving candidate paired
/// with its parent gene set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedRow {
    /// Upper-cased candidate gene symbol.
    pub gene: String,
    /// Candidate rank within its report.
    pub rank: u32,
    /// Candidate score.
    pub score: f64,
    /// Candidate description (lookup-overridden when available).
    pub description: String,
    /// Parent gene-set identifier.
    pub gene_set: String,
    /// Parent set score.
    pub ausr: f64,
    /// Parent set raw p-value.
    pub p_value: f64,
    /// Parent set bait-gene count.
    pub genes_in_data: usize,
    /// Parent set description, when a lookup was supplied.
    pub set_description: Option<String>,
}

/// Write the summary table. Rows are expected sorted ascending by p-value.
pub fn write_summary(path: &Path, rows: &[SummaryRow], with_set_description: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["group", "AUSR", "genes_in_data", "genes_missing", "candidates"];
    if with_set_description {
        header.push("set_description");
    }
    header.push("p-value");
    header.push("BH-corrected");
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.group.clone(),
            row.ausr.to_string(),
            row.genes_in_data.to_string(),
            row.genes_missing.to_string(),
            row.candidates.to_string(),
        ];
        if with_set_description {
            record.push(row.set_description.clone().unwrap_or_default());
        }
        record.push(row.p_value.to_string());
        record.push(row.bh_corrected.unwrap_or(f64::NAN).to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the extended-annotation table (or a full supplementary table).
pub fn write_extended(path: &Path, rows: &[ExtendedRow], with_set_description: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "gene",
        "rank",
        "score",
        "description",
        "gene_set",
        "AUSR",
        "p-value",
        "genes_in_data",
    ];
    if with_set_description {
        header.push("set_description");
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.gene.clone(),
            row.rank.to_string(),
            row.score.to_string(),
            row.description.clone(),
            row.gene_set.clone(),
            row.ausr.to_string(),
            row.p_value.to_string(),
            row.genes_in_data.to_string(),
        ];
        if with_set_description {
            record.push(row.set_description.clone().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a grouped supplementary table: one row per
/// (set description, score, p-value, gene count) with the matching genes
/// space-joined, ascending by key.
pub fn write_grouped(path: &Path, rows: &[ExtendedRow]) -> Result<()> {
    let mut sorted: Vec<&ExtendedRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        group_key(a)
            .partial_cmp(&group_key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["set_description", "AUSR", "p-value", "genes_in_data", "genes"])?;

    let mut i = 0;
    while i < sorted.len() {
        let key = group_key(sorted[i]);
        let mut genes = vec![sorted[i].gene.clone()];
        let mut j = i + 1;
        while j < sorted.len() && group_key(sorted[j]) == key {
            genes.push(sorted[j].gene.clone());
            j += 1;
        }
        writer.write_record([
            key.0.to_string(),
            key.1.to_string(),
            key.2.to_string(),
            key.3.to_string(),
            genes.join(" "),
        ])?;
        i = j;
    }
    writer.flush()?;
    Ok(())
}

/// Grouping key for the non-full supplementary tables; a missing set
/// description groups under the empty string.
fn group_key(row: &ExtendedRow) -> (&str, f64, f64, usize) {
    (
        row.set_description.as_deref().unwrap_or(""),
        row.ausr,
        row.p_value,
        row.genes_in_data,
    )
}
