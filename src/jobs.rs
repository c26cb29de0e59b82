//! Boundary documents exchanged with the external ranking tool.
//!
//! The tool consumes a YAML job list (which gene sets to rank for which
//! species) and a YAML configuration (cache location plus per-species
//! dataset and clustering metadata), and produces one report file per job
//! in an output directory. This crate only types and (de)serializes the
//! documents; it never invokes the tool.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One gene-set file to be ranked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneSetFile {
    /// Gene-set name; reports embed it in their file names.
    pub name: String,
    /// Path to the space-separated bait gene list.
    pub path: String,
}

/// All gene sets to rank against one species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub species_name: String,
    pub data_path: String,
    pub genes_of_interest: Vec<GeneSetFile>,
}

/// Top-level job-list document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    pub data_path: String,
    pub jobs: Vec<Job>,
}

impl JobList {
    /// Parse a job-list document from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// A small sample document, for bootstrapping new setups.
    pub fn example() -> Self {
        JobList {
            data_path: "species_data".to_string(),
            jobs: vec![Job {
                species_name: "arabidopsis".to_string(),
                data_path: "arabidopsis".to_string(),
                genes_of_interest: vec![
                    GeneSetFile {
                        name: "pathway__ath00010".to_string(),
                        path: "gene_sets/pathway__ath00010".to_string(),
                    },
                    GeneSetFile {
                        name: "pathway__ath00020".to_string(),
                        path: "gene_sets/pathway__ath00020".to_string(),
                    },
                ],
            }],
        }
    }
}

/// One clustering of an expression matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clustering {
    pub name: String,
    pub path: String,
}

/// One expression matrix with its clusterings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionMatrix {
    pub name: String,
    pub path: String,
    pub clusterings: Vec<Clustering>,
}

/// Per-species metadata block of the ranking-tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub data_path: String,
    pub example_goi: String,
    pub gene_descriptions: String,
    pub gene_web_page: String,
    pub gene_pattern: String,
    pub expression_matrices: Vec<ExpressionMatrix>,
}

/// Top-level ranking-tool configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    pub cache_path: String,
    pub species: Vec<Species>,
    pub species_data_path: String,
}

impl RankerConfig {
    /// Parse a configuration document from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_job_list_document() {
        let yaml = "\
data_path: 'plaza'
jobs:
- species_name: 'arabidopsis'
  data_path: 'arabidopsis'
  genes_of_interest:
  - name: 'go__GO:0006979'
    path: '/data/gene_sets/go__GO:0006979'
";
        let job_list = JobList::from_yaml(yaml).unwrap();
        assert_eq!(job_list.jobs.len(), 1);
        assert_eq!(job_list.jobs[0].genes_of_interest[0].name, "go__GO:0006979");
    }

    #[test]
    fn parses_ranker_config_document() {
        let yaml = "\
cache_path: '/tmp/cache'
species_data_path: '/data'
species:
- name: 'arabidopsis'
  data_path: 'arabidopsis'
  example_goi: 'none specified'
  gene_descriptions: 'gene_descriptions.tsv'
  gene_web_page: 'http://example/$name'
  gene_pattern: '.+'
  expression_matrices:
  - name: 'dataset1'
    path: 'datasets/dataset1'
    clusterings:
    - name: 'click'
      path: 'clusterings/click/dataset1.click.clustering'
";
        let config = RankerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.species[0].expression_matrices.len(), 1);
        assert_eq!(
            config.species[0].expression_matrices[0].clusterings[0].name,
            "click"
        );
    }

    #[test]
    fn example_job_list_serializes() {
        let yaml = JobList::example().to_yaml().unwrap();
        assert!(yaml.contains("genes_of_interest"));
    }
}
