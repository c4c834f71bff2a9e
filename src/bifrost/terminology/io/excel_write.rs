use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::bifrost::terminology::error::Result;
use crate::bifrost::terminology::layout::{Cell, SheetTable};

/// Writes the table to a new workbook at `path`, replacing any existing file.
pub fn write_sheet(path: &Path, table: &SheetTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = col_idx as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col_num, text)?;
                }
                Cell::Link { label, url } => {
                    worksheet.write_url_with_text(row_num, col_num, url.as_str(), label)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
