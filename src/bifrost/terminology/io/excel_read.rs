use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::Timelike;
use tracing::{debug, info, warn};

use crate::bifrost::terminology::error::{Result, ToolError};
use crate::bifrost::terminology::model::{TermMap, TermRecord, insert_term};

/// Zero-based column positions in the ICNP table.
pub const PRIMARY_CODE_COLUMN: usize = 1;
pub const PRIMARY_AXIS_COLUMN: usize = 2;
pub const PRIMARY_TERM_COLUMN: usize = 7;
pub const PRIMARY_DEFINITION_COLUMN: usize = 8;

/// Zero-based column positions in the ICNP-SCT mapping tables.
pub const MAPPING_CODE_COLUMN: usize = 0;
pub const MAPPING_SCT_COLUMN: usize = 2;

/// A non-empty row of the first sheet with its cells formatted as text.
///
/// `cells[n]` is always column `n` of the sheet, even when the used range of
/// the sheet does not start in column A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// Zero-based row number in the sheet.
    pub index: usize,
    pub cells: Vec<String>,
}

impl SheetRow {
    /// Text of the given column, empty when the row is shorter.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// One row of an ICNP-SCT mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceRow {
    pub code: String,
    /// Raw SNOMED CT cell text, possibly blank.
    pub cross_reference: String,
}

/// Reads every non-empty row of the first sheet of the workbook at `path`.
///
/// The workbook is closed before this function returns, on success and on
/// error alike.
pub fn read_first_sheet(path: &Path) -> Result<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ToolError::InvalidWorkbook(format!("{} contains no sheets", path.display()))
        })?
        .map_err(ToolError::from)?;
    Ok(collect_rows(&range))
}

fn collect_rows(range: &Range<DataType>) -> Vec<SheetRow> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let offset = start_col as usize;

    range
        .rows()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.is_empty()))
        .map(|(idx, row)| {
            let mut cells = vec![String::new(); offset];
            cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
            SheetRow {
                index: start_row as usize + idx,
                cells,
            }
        })
        .collect()
}

/// Formats a cell the way it is displayed: integral numbers have no
/// fractional part, so a SNOMED CT id stored as a number reads `274663008`.
/// Date cells read `2020-10-15`, or `2020-10-15 08:30:00` when they carry a
/// time of day, and durations read `h:mm:ss`.
pub fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string().to_uppercase(),
        Some(DataType::Empty) | None => String::new(),
        Some(date @ (DataType::DateTime(_) | DataType::DateTimeIso(_))) => format_date(date),
        Some(duration @ (DataType::Duration(_) | DataType::DurationIso(_))) => {
            format_duration(duration)
        }
        Some(other) => other.to_string(),
    }
}

fn format_date(cell: &DataType) -> String {
    match cell.as_datetime() {
        Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
            datetime.format("%Y-%m-%d").to_string()
        }
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
    }
}

fn format_duration(cell: &DataType) -> String {
    match cell.as_duration() {
        Some(duration) => {
            let seconds = duration.num_seconds();
            format!(
                "{}:{:02}:{:02}",
                seconds / 3600,
                (seconds % 3600) / 60,
                seconds % 60
            )
        }
        None => cell.to_string(),
    }
}

/// Loads the ICNP table into a map keyed by code.
///
/// Rows are read in sheet order and a later row replaces an earlier row with
/// the same code. With `skip_header` the first non-empty row is ignored;
/// otherwise it is read as data. Rows with a blank code are skipped.
pub fn read_terms(path: &Path, skip_header: bool) -> Result<TermMap> {
    let rows = read_first_sheet(path)?;
    let mut terms = TermMap::new();
    let mut processed = 0usize;

    for row in rows.iter().skip(usize::from(skip_header)) {
        processed += 1;
        let code = row.cell(PRIMARY_CODE_COLUMN);
        if code.trim().is_empty() {
            warn!(row = row.index, "skipping row without a code");
            continue;
        }
        let record = TermRecord::new(
            code,
            row.cell(PRIMARY_AXIS_COLUMN),
            row.cell(PRIMARY_TERM_COLUMN),
            row.cell(PRIMARY_DEFINITION_COLUMN),
        );
        if insert_term(&mut terms, record).is_some() {
            debug!(code, row = row.index, "duplicate code replaces earlier row");
        }
    }

    info!(rows = processed, terms = terms.len(), "read rows from primary table");
    Ok(terms)
}

/// Reads the code and SNOMED CT columns of a mapping table.
pub fn read_cross_references(path: &Path) -> Result<Vec<CrossReferenceRow>> {
    let rows = read_first_sheet(path)?;
    Ok(rows
        .iter()
        .map(|row| CrossReferenceRow {
            code: row.cell(MAPPING_CODE_COLUMN).to_string(),
            cross_reference: row.cell(MAPPING_SCT_COLUMN).to_string(),
        })
        .collect())
}
