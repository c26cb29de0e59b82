//! Functional classification of candidate genes by description text.
//!
//! Categories are tried in a fixed priority order; within a category the
//! patterns are tried in order and the first category with any match wins.
//! A description matching nothing belongs to no category, which is
//! expected and silent.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// Functional category of a candidate gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Uncharacterized or hypothetical proteins.
    Unknown,
    /// Transcription factors and transcriptional regulators.
    TranscriptionFactor,
    /// Signalling components (kinases, receptors, ...).
    Signal,
    /// Membrane transport proteins.
    Transporter,
}

impl Category {
    /// All categories in classification priority order.
    pub const ALL: [Category; 4] = [
        Category::Unknown,
        Category::TranscriptionFactor,
        Category::Signal,
        Category::Transporter,
    ];

    /// Category name, used for supplementary table file names.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::TranscriptionFactor => "transcription-factor",
            Category::Signal => "signal",
            Category::Transporter => "transporter",
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Category::Unknown => &["unknown", "n/a", "hypothetical"],
            Category::TranscriptionFactor => &[
                "transcription factor",
                "transcriptional activator",
                "transcriptional coactivator",
                "transcriptional effector",
                "transcriptional regulator",
            ],
            Category::Signal => &["kinase", "receptor", "calmodulin", "phosphatase", "ubiquitin"],
            Category::Transporter => &["transporter", "exchanger", "antiporter", "symporter"],
        }
    }
}

/// Description matcher with all category patterns compiled once.
#[derive(Debug)]
pub struct Classifier {
    table: Vec<(Category, Vec<Regex>)>,
}

impl Classifier {
    /// Compile the category pattern table.
    pub fn new() -> Result<Self> {
        let mut table = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let mut patterns = Vec::new();
            for pattern in category.patterns() {
                let regex = Regex::new(&format!("(?i){}", pattern)).map_err(|e| {
                    MorphError::Config(format!("invalid category pattern {:?}: {}", pattern, e))
                })?;
                patterns.push(regex);
            }
            table.push((category, patterns));
        }
        Ok(Classifier { table })
    }

    /// First category with any pattern matching `description`, or `None`.
    pub fn classify(&self, description: &str) -> Option<Category> {
        for (category, patterns) in &self.table {
            if patterns.iter().any(|p| p.is_match(description)) {
                return Some(*category);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        let classifier = Classifier::new().unwrap();
        assert_eq!(
            classifier.classify("Serine/threonine KINASE 4"),
            Some(Category::Signal)
        );
        assert_eq!(
            classifier.classify("putative Transcription Factor bHLH"),
            Some(Category::TranscriptionFactor)
        );
        assert_eq!(
            classifier.classify("sodium/proton ANTIPORTER"),
            Some(Category::Transporter)
        );
        assert_eq!(
            classifier.classify("Hypothetical protein"),
            Some(Category::Unknown)
        );
    }

    #[test]
    fn no_match_yields_none() {
        let classifier = Classifier::new().unwrap();
        assert_eq!(classifier.classify("cell wall biogenesis protein"), None);
    }

    #[test]
    fn first_category_in_fixed_order_wins() {
        let classifier = Classifier::new().unwrap();
        // Matches both a signal pattern (kinase) and a transporter pattern
        // (transporter); signal is checked first.
        assert_eq!(
            classifier.classify("kinase associated with sugar transporter"),
            Some(Category::Signal)
        );
        // An unknown pattern beats everything later in the order.
        assert_eq!(
            classifier.classify("unknown receptor-like protein"),
            Some(Category::Unknown)
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = Classifier::new().unwrap();
        let description = "calmodulin-binding receptor kinase";
        let first = classifier.classify(description);
        for _ in 0..10 {
            assert_eq!(classifier.classify(description), first);
        }
    }
}
