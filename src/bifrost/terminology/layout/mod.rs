use crate::bifrost::terminology::model::{TermMap, TermRecord};

/// Name of the single sheet of the exported workbook.
pub const SHEET_NAME: &str = "ICNP-SCT";
/// Header row of the exported workbook.
pub const HEADERS: [&str; 5] = ["ICNP", "AXIS", "SCT", "TERM", "DEFINITION"];

const ICNP_BROWSER_URL: &str = "https://neuronsong.com//_/_sites/icnp-browser/#/2019/concepts/no/";
const SNOMED_BROWSER_URL: &str = "https://browser.ihtsdotools.org/?perspective=full&conceptId1=";
const SNOMED_BROWSER_SUFFIX: &str = "&edition=MAIN/SNOMEDCT-NO/2020-10-15&release=&languages=no,en";

/// Link to the ICNP concept in the Norwegian ICNP browser. Codes are inserted
/// verbatim.
pub fn icnp_url(code: &str) -> String {
    format!("{ICNP_BROWSER_URL}{code}")
}

/// Link to the concept in the SNOMED CT browser, Norwegian edition.
pub fn snomed_url(code: &str) -> String {
    format!("{SNOMED_BROWSER_URL}{code}{SNOMED_BROWSER_SUFFIX}")
}

/// Content of one output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Nothing is written.
    Empty,
    Text(String),
    /// A hyperlink whose displayed value is `label`.
    Link { label: String, url: String },
}

impl Cell {
    /// Displayed value of the cell.
    pub fn label(&self) -> &str {
        match self {
            Cell::Empty => "",
            Cell::Text(text) => text,
            Cell::Link { label, .. } => label,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Cell::Link { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// A sheet ready to be written: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Lays the terms out as the ICNP-SCT sheet, one row per term in map order.
pub fn build_sheet(terms: &TermMap) -> SheetTable {
    SheetTable {
        sheet_name: SHEET_NAME.to_string(),
        columns: HEADERS.iter().map(|header| header.to_string()).collect(),
        rows: terms.values().map(term_row).collect(),
    }
}

fn term_row(record: &TermRecord) -> Vec<Cell> {
    let sct = match &record.cross_reference_code {
        Some(code) => Cell::Link {
            label: code.clone(),
            url: snomed_url(code),
        },
        None => Cell::Empty,
    };

    vec![
        Cell::Link {
            label: record.code.clone(),
            url: icnp_url(&record.code),
        },
        Cell::Text(record.axis.clone()),
        sct,
        Cell::Text(record.term.clone()),
        Cell::Text(record.definition.clone()),
    ]
}
