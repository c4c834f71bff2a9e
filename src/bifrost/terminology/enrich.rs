use std::path::Path;

use tracing::{info, instrument, warn};

use crate::bifrost::terminology::error::Result;
use crate::bifrost::terminology::io::excel_read::{self, CrossReferenceRow};
use crate::bifrost::terminology::model::TermMap;

/// Outcome of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Mapping rows read.
    pub rows: usize,
    /// Rows whose code exists in the term map.
    pub matched: usize,
    /// Rows whose code does not.
    pub unmatched: usize,
}

/// Applies the rows to the matching terms. A row overwrites whatever an earlier
/// row or pass stored; a blank SNOMED CT value clears the cross-reference.
pub fn apply_cross_references(rows: &[CrossReferenceRow], terms: &mut TermMap) -> EnrichReport {
    let mut report = EnrichReport {
        rows: rows.len(),
        ..EnrichReport::default()
    };

    for row in rows {
        match terms.get_mut(&row.code) {
            Some(record) => {
                record.set_cross_reference(Some(&row.cross_reference));
                report.matched += 1;
            }
            None => {
                warn!(code = %row.code, "unexpected code");
                report.unmatched += 1;
            }
        }
    }

    report
}

/// Reads the mapping workbook at `path` and applies it to `terms`.
///
/// The workbook is read completely before the first term is touched, so an
/// error leaves `terms` exactly as it was.
#[instrument(level = "info", skip(terms), fields(input = %path.display()))]
pub fn enrich_from_file(path: &Path, terms: &mut TermMap) -> Result<EnrichReport> {
    let rows = excel_read::read_cross_references(path)?;
    let report = apply_cross_references(&rows, terms);
    info!(
        rows = report.rows,
        matched = report.matched,
        unmatched = report.unmatched,
        "applied cross-references"
    );
    Ok(report)
}
