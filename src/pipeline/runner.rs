//! Orchestration of a full summary run over a directory of reports.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{Category, Classifier};
use crate::descriptions::load_descriptions;
use crate::error::{MorphError, Result};
use crate::pipeline::tables::{self, ExtendedRow, SummaryRow};
use crate::report::parse_report;
use crate::stats::correct::correct_bh;
use crate::stats::null_dist::{NullDistribution, DEFAULT_SCORE_COLUMN};

/// What to do when a single report file fails to parse.
///
/// Either choice is explicit: the pipeline never substitutes defaults for
/// a malformed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorPolicy {
    /// Abort the whole batch on the first malformed report.
    Abort,
    /// Skip the malformed report with a warning and keep going.
    Skip,
}

/// Configuration for one summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Directory of report files, one per gene set.
    pub input_dir: PathBuf,
    /// Output directory for the generated tables.
    pub output_dir: PathBuf,
    /// Null-distribution CSV from randomized runs.
    pub null_table: PathBuf,
    /// Name of the score column in the null-distribution CSV.
    pub score_column: String,
    /// Optional gene-set description lookup (TSV).
    pub set_descriptions: Option<PathBuf>,
    /// Optional gene description lookup (TSV), overriding report text.
    pub gene_descriptions: Option<PathBuf>,
    /// Generate per-category supplementary tables.
    pub supplementary: bool,
    /// Emit full per-candidate supplementary rows instead of grouped ones.
    pub full: bool,
    /// FDR level for significance and candidate gathering.
    pub fdr_level: f64,
    /// Candidate score cut-off; `None` keeps every candidate.
    pub score_cut_off: Option<f64>,
    /// Per-file parse failure policy.
    pub on_parse_error: ParseErrorPolicy,
}

impl SummaryConfig {
    /// Configuration with the customary defaults.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        null_table: impl Into<PathBuf>,
    ) -> Self {
        SummaryConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            null_table: null_table.into(),
            score_column: DEFAULT_SCORE_COLUMN.to_string(),
            set_descriptions: None,
            gene_descriptions: None,
            supplementary: false,
            full: false,
            fdr_level: 0.05,
            score_cut_off: None,
            on_parse_error: ParseErrorPolicy::Abort,
        }
    }
}

/// Closing counters of a summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTotals {
    /// Gene sets summarized.
    pub total_sets: usize,
    /// Gene sets significant after FDR control.
    pub significant_sets: usize,
    /// Distinct genes receiving a new annotation.
    pub annotated_genes: usize,
    /// Extended-annotation rows emitted.
    pub annotations: usize,
}

/// The aggregation pipeline. Construction validates the configuration and
/// loads every enrichment input up front; `run` performs the batch.
#[derive(Debug)]
pub struct Summarizer {
    config: SummaryConfig,
    null: NullDistribution,
    set_descriptions: Option<HashMap<String, String>>,
    gene_descriptions: Option<HashMap<String, String>>,
    classifier: Option<Classifier>,
}

impl Summarizer {
    /// Validate `config` and load the null table and description lookups.
    ///
    /// Fails fast, before any report is read: an unreadable null table or
    /// a missing lookup file requested by the configuration is a
    /// configuration error, not a mid-run surprise.
    pub fn new(config: SummaryConfig) -> Result<Self> {
        if !(config.fdr_level.is_finite() && config.fdr_level > 0.0 && config.fdr_level <= 1.0) {
            return Err(MorphError::Config(format!(
                "FDR level must lie in (0, 1], got {}",
                config.fdr_level
            )));
        }

        let null = NullDistribution::from_csv(&config.null_table, &config.score_column)?;
        let set_descriptions = match &config.set_descriptions {
            Some(path) => Some(load_descriptions(path)?),
            None => None,
        };
        let gene_descriptions = match &config.gene_descriptions {
            Some(path) => Some(load_descriptions(path)?),
            None => None,
        };
        let classifier = if config.supplementary {
            Some(Classifier::new()?)
        } else {
            None
        };

        Ok(Summarizer {
            config,
            null,
            set_descriptions,
            gene_descriptions,
            classifier,
        })
    }

    /// Run the batch: parse every report, attach p-values, correct, filter
    /// and classify, and write the output tables.
    pub fn run(&self) -> Result<RunTotals> {
        self.prepare_output_dir()?;

        let report_files = self.report_files()?;
        info!(n_reports = report_files.len(), "starting summary run");

        let mut rows: Vec<SummaryRow> = Vec::new();
        let mut gathered: Vec<ExtendedRow> = Vec::new();
        for path in &report_files {
            let parsed = match parse_report(path, self.gene_descriptions.as_ref()) {
                Ok(parsed) => parsed,
                Err(err) => match self.config.on_parse_error {
                    ParseErrorPolicy::Abort => return Err(err),
                    ParseErrorPolicy::Skip => {
                        warn!(%err, "skipping unparseable report");
                        continue;
                    }
                },
            };
            let (report, candidates) = parsed;

            let p_value = self
                .null
                .p_value(report.genes_in_data.len() as u32, report.ausr);
            let set_description = self.set_description_for(&report.group);

            rows.push(SummaryRow {
                group: report.group.clone(),
                ausr: report.ausr,
                genes_in_data: report.genes_in_data.len(),
                genes_missing: report.genes_missing.len(),
                candidates: candidates.len(),
                set_description: set_description.clone(),
                p_value,
                bh_corrected: None,
            });

            // Candidate gathering is gated on the raw p-value; the final
            // table is restricted again after correction.
            if p_value < self.config.fdr_level {
                for candidate in &candidates {
                    let passes = match self.config.score_cut_off {
                        Some(cut_off) => candidate.score > cut_off,
                        None => true,
                    };
                    if passes {
                        gathered.push(ExtendedRow {
                            gene: candidate.gene.clone(),
                            rank: candidate.rank,
                            score: candidate.score,
                            description: candidate.description.clone(),
                            gene_set: report.group.clone(),
                            ausr: report.ausr,
                            p_value,
                            genes_in_data: report.genes_in_data.len(),
                            set_description: set_description.clone(),
                        });
                    }
                }
            }
        }

        if rows.is_empty() {
            return Err(MorphError::EmptyData(format!(
                "no reports summarized from {}",
                self.config.input_dir.display()
            )));
        }

        info!(
            fdr_level = self.config.fdr_level,
            "applying FDR correction at gene set level (Benjamini-Hochberg)"
        );
        let p_values: Vec<f64> = rows.iter().map(|r| r.p_value).collect();
        let corrected = correct_bh(&p_values, self.config.fdr_level);
        for (row, bh) in rows.iter_mut().zip(corrected) {
            row.bh_corrected = Some(bh);
        }
        rows.sort_by(|a, b| {
            a.p_value
                .partial_cmp(&b.p_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let extended = self.restrict_to_significant(&rows, gathered);
        let totals = self.emit(&rows, &extended)?;

        info!(totals.total_sets, "total number of gene sets");
        info!(
            totals.significant_sets,
            "significant scoring gene sets (FDR controlled)"
        );
        info!(totals.annotated_genes, "genes with new annotation");
        info!(totals.annotations, "annotations");
        Ok(totals)
    }

    /// Create the output directory up front; an existing directory is an
    /// overwrite risk and is reported, not failed on.
    fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if dir.is_dir() {
            warn!(
                directory = %dir.display(),
                "output directory already exists, files may be overwritten"
            );
        } else {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Report files in the input directory, sorted for determinism.
    fn report_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.config.input_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        if files.is_empty() {
            return Err(MorphError::EmptyData(format!(
                "no report files in {}",
                self.config.input_dir.display()
            )));
        }
        Ok(files)
    }

    /// Set description for `group`; a configured lookup without an entry
    /// for the group is a warning, never a failure.
    fn set_description_for(&self, group: &str) -> Option<String> {
        let lookup = self.set_descriptions.as_ref()?;
        match lookup.get(group) {
            Some(description) => Some(description.clone()),
            None => {
                warn!(group, "no set description found");
                None
            }
        }
    }

    /// Keep only rows belonging to sets whose corrected value is below the
    /// FDR level, grouped in ascending-p order of their sets.
    fn restrict_to_significant(
        &self,
        rows: &[SummaryRow],
        gathered: Vec<ExtendedRow>,
    ) -> Vec<ExtendedRow> {
        let significant: Vec<&str> = rows
            .iter()
            .filter(|r| r.bh_corrected.unwrap_or(f64::NAN) < self.config.fdr_level)
            .map(|r| r.group.as_str())
            .collect();
        if significant.is_empty() {
            warn!("no significant sets found");
            return Vec::new();
        }

        let mut extended = Vec::new();
        for group in significant {
            extended.extend(gathered.iter().filter(|r| r.gene_set == group).cloned());
        }
        extended
    }

    /// Write every output table and compute the closing counters.
    fn emit(&self, rows: &[SummaryRow], extended: &[ExtendedRow]) -> Result<RunTotals> {
        let with_set_description = self.set_descriptions.is_some();
        let out = &self.config.output_dir;

        tables::write_summary(&out.join("summary.csv"), rows, with_set_description)?;
        tables::write_extended(
            &out.join("extended_annotation.csv"),
            extended,
            with_set_description,
        )?;

        if let Some(classifier) = &self.classifier {
            let mut buckets: HashMap<Category, Vec<ExtendedRow>> = HashMap::new();
            for row in extended {
                if let Some(category) = classifier.classify(&row.description) {
                    buckets.entry(category).or_default().push(row.clone());
                }
            }
            for category in Category::ALL {
                let rows = buckets.get(&category).map(Vec::as_slice).unwrap_or(&[]);
                let path = out.join(format!("{}.csv", category.name()));
                if self.config.full {
                    tables::write_extended(&path, rows, with_set_description)?;
                } else if !rows.is_empty() {
                    tables::write_grouped(&path, rows)?;
                }
            }
        }

        let annotated_genes: HashSet<&str> = extended.iter().map(|r| r.gene.as_str()).collect();
        Ok(RunTotals {
            total_sets: rows.len(),
            significant_sets: rows
                .iter()
                .filter(|r| r.bh_corrected.unwrap_or(f64::NAN) < self.config.fdr_level)
                .count(),
            annotated_genes: annotated_genes.len(),
            annotations: extended.len(),
        })
    }
}
