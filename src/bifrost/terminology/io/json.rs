use std::fs;
use std::path::Path;

use crate::bifrost::terminology::error::Result;
use crate::bifrost::terminology::model::{TermMap, TermRecord};

/// Writes the records of `terms`, in map order, as a pretty-printed JSON
/// array. Absent cross-references are written as `null`.
pub fn write_terms_json(path: &Path, terms: &TermMap) -> Result<()> {
    let records: Vec<&TermRecord> = terms.values().collect();
    let json_string = serde_json::to_string_pretty(&records)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Reads an array written by [`write_terms_json`].
pub fn read_terms_json(path: &Path) -> Result<Vec<TermRecord>> {
    let source = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&source)?)
}
