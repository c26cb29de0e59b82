//! Gene and gene-set description lookups.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Load a two-column `id<TAB>description` lookup file.
///
/// Lines without a second column map to the literal description `"NA"`.
/// Empty lines are skipped. Later entries for the same id win.
pub fn load_descriptions(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut lookup = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.trim().is_empty() {
            continue;
        }
        match trimmed.split_once('\t') {
            Some((id, description)) => {
                lookup.insert(id.trim().to_string(), description.trim().to_string());
            }
            None => {
                lookup.insert(trimmed.trim().to_string(), "NA".to_string());
            }
        }
    }
    Ok(lookup)
}
