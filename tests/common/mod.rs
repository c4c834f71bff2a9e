#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

/// A fixture cell: text, a number, a number shown through a format, or
/// nothing.
pub enum Fixture<'a> {
    Text(&'a str),
    Number(f64),
    Formatted(f64, &'a str),
    Blank,
}

/// Writes `rows` to the first sheet of a new workbook at `path`.
pub fn write_fixture(path: &Path, rows: &[Vec<Fixture<'_>>]) -> PathBuf {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (row_num, col_num) = (row_idx as u32, col_idx as u16);
            match cell {
                Fixture::Text(text) => {
                    worksheet.write_string(row_num, col_num, *text).unwrap();
                }
                Fixture::Number(number) => {
                    worksheet.write_number(row_num, col_num, *number).unwrap();
                }
                Fixture::Formatted(number, num_format) => {
                    let format = Format::new().set_num_format(*num_format);
                    worksheet
                        .write_number_with_format(row_num, col_num, *number, &format)
                        .unwrap();
                }
                Fixture::Blank => {}
            }
        }
    }
    workbook.save(path).expect("fixture written");
    path.to_path_buf()
}

/// A primary table row with the code, axis, term and definition in columns
/// 1, 2, 7 and 8.
pub fn primary_row<'a>(
    code: &'a str,
    axis: &'a str,
    term: &'a str,
    definition: &'a str,
) -> Vec<Fixture<'a>> {
    vec![
        Fixture::Blank,
        Fixture::Text(code),
        Fixture::Text(axis),
        Fixture::Blank,
        Fixture::Blank,
        Fixture::Blank,
        Fixture::Blank,
        Fixture::Text(term),
        Fixture::Text(definition),
    ]
}

/// A mapping table row with the code in column 0 and the SNOMED CT id in
/// column 2.
pub fn mapping_row<'a>(code: &'a str, sct: &'a str) -> Vec<Fixture<'a>> {
    vec![
        Fixture::Text(code),
        Fixture::Text("ignored"),
        if sct.is_empty() {
            Fixture::Blank
        } else {
            Fixture::Text(sct)
        },
    ]
}
