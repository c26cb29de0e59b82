//! morph-bulk - MORPH bulk run summary CLI
//!
//! Command-line interface for summarizing and statistically filtering
//! MORPH bulk gene-prioritization runs.

use clap::{Parser, Subcommand};
use morph_bulk::error::Result;
use morph_bulk::jobs::JobList;
use morph_bulk::pipeline::{ParseErrorPolicy, SummaryConfig, Summarizer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// MORPH bulk run post-processing
#[derive(Parser)]
#[command(name = "morph-bulk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a bulk run directory into FDR-controlled tables
    Post {
        /// Directory of MORPH report files, one per gene set
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for the generated tables
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Null-distribution CSV from a randomized run
        #[arg(short, long)]
        null_table: PathBuf,

        /// Score column name in the null-distribution CSV
        #[arg(long, default_value = "AUSR")]
        score_column: String,

        /// Gene-set description lookup (tab-separated)
        #[arg(long)]
        set_descriptions: Option<PathBuf>,

        /// Gene description lookup (tab-separated), overrides report text
        #[arg(long)]
        gene_descriptions: Option<PathBuf>,

        /// Generate per-category supplementary tables
        #[arg(short, long)]
        supplementary: bool,

        /// Full per-candidate supplementary rows instead of grouped ones
        #[arg(long)]
        full: bool,

        /// FDR level for significance and candidate gathering
        #[arg(long, default_value = "0.05")]
        fdr_level: f64,

        /// Candidate score cut-off; omit to keep every candidate
        #[arg(long)]
        score_cutoff: Option<f64>,

        /// Skip unparseable reports with a warning instead of aborting
        #[arg(long)]
        skip_bad_reports: bool,

        /// Output format for the run totals: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write an example job-list document for the external ranking tool
    ExampleJobList {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "job_list.yaml")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Post {
            input_dir,
            output_dir,
            null_table,
            score_column,
            set_descriptions,
            gene_descriptions,
            supplementary,
            full,
            fdr_level,
            score_cutoff,
            skip_bad_reports,
            format,
        } => cmd_post(
            input_dir,
            output_dir,
            null_table,
            score_column,
            set_descriptions,
            gene_descriptions,
            supplementary,
            full,
            fdr_level,
            score_cutoff,
            skip_bad_reports,
            &format,
        ),

        Commands::ExampleJobList { output } => cmd_example_job_list(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run the summarizer over a bulk run directory.
#[allow(clippy::too_many_arguments)]
fn cmd_post(
    input_dir: PathBuf,
    output_dir: PathBuf,
    null_table: PathBuf,
    score_column: String,
    set_descriptions: Option<PathBuf>,
    gene_descriptions: Option<PathBuf>,
    supplementary: bool,
    full: bool,
    fdr_level: f64,
    score_cutoff: Option<f64>,
    skip_bad_reports: bool,
    format: &str,
) -> Result<()> {
    let mut config = SummaryConfig::new(input_dir, output_dir.clone(), null_table);
    config.score_column = score_column;
    config.set_descriptions = set_descriptions;
    config.gene_descriptions = gene_descriptions;
    config.supplementary = supplementary;
    config.full = full;
    config.fdr_level = fdr_level;
    config.score_cut_off = score_cutoff;
    config.on_parse_error = if skip_bad_reports {
        ParseErrorPolicy::Skip
    } else {
        ParseErrorPolicy::Abort
    };

    let totals = Summarizer::new(config)?.run()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&totals)?),
        _ => {
            println!("Summary written to {:?}", output_dir);
            println!("  Gene sets:            {}", totals.total_sets);
            println!("  Significant (FDR):    {}", totals.significant_sets);
            println!("  Newly annotated genes: {}", totals.annotated_genes);
            println!("  Annotations:          {}", totals.annotations);
        }
    }

    Ok(())
}

/// Write an example job-list YAML document.
fn cmd_example_job_list(output_path: &PathBuf) -> Result<()> {
    let yaml = JobList::example().to_yaml()?;
    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example job list to {:?}", output_path);
    eprintln!();
    println!("{}", yaml);
    Ok(())
}
