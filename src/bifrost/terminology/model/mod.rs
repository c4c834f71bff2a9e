use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of an ICNP concept, as found in the primary table.
pub type TermCode = String;

/// All term records of a run keyed by their code. The ordered map keeps both
/// exports sorted by code so repeated runs produce identical files.
pub type TermMap = BTreeMap<TermCode, TermRecord>;

/// One ICNP terminology entry, optionally mapped to a SNOMED CT concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    /// ICNP concept code, the key of the record in a [`TermMap`].
    pub code: TermCode,
    /// Seven-axis classification label.
    pub axis: String,
    /// Preferred display name.
    pub term: String,
    /// Free text definition.
    pub definition: String,
    /// SNOMED CT concept id attached by an enrichment pass.
    pub cross_reference_code: Option<String>,
}

impl TermRecord {
    /// Creates a record without a cross-reference.
    pub fn new(
        code: impl Into<TermCode>,
        axis: impl Into<String>,
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            axis: axis.into(),
            term: term.into(),
            definition: definition.into(),
            cross_reference_code: None,
        }
    }

    /// Replaces the cross-reference. Blank values clear it.
    pub fn set_cross_reference(&mut self, value: Option<&str>) {
        self.cross_reference_code = normalize_cross_reference(value);
    }
}

/// Maps blank and whitespace-only values to `None`.
pub fn normalize_cross_reference(value: Option<&str>) -> Option<String> {
    value
        .filter(|candidate| !candidate.trim().is_empty())
        .map(str::to_string)
}

/// Inserts the record under its own code, replacing any previous record with
/// the same code. Returns the replaced record.
pub fn insert_term(terms: &mut TermMap, record: TermRecord) -> Option<TermRecord> {
    terms.insert(record.code.clone(), record)
}
