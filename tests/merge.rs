mod common;

use std::io::Read;
use std::path::Path;

use bifrost_terminology::ToolError;
use bifrost_terminology::config::{Config, EnrichmentFailure};
use bifrost_terminology::enrich::{self, EnrichReport};
use bifrost_terminology::io::excel_read::{self, CrossReferenceRow};
use bifrost_terminology::layout::snomed_url;
use bifrost_terminology::model::{TermMap, TermRecord};
use bifrost_terminology::pipeline;
use calamine::{Reader, Xlsx, open_workbook};
use common::{Fixture, mapping_row, primary_row, write_fixture};
use tempfile::tempdir;

fn read_package_part(workbook: &Path, part: &str) -> String {
    let file = std::fs::File::open(workbook).expect("workbook opened");
    let mut archive = zip::ZipArchive::new(file).expect("xlsx is a zip package");
    let mut entry = archive.by_name(part).expect("package part present");
    let mut content = String::new();
    entry.read_to_string(&mut content).expect("package part read");
    content
}

fn sample_terms() -> TermMap {
    let mut terms = TermMap::new();
    for record in [
        TermRecord::new("A1", "Focus", "Pain", "Unpleasant sensation"),
        TermRecord::new("B2", "Action", "Teaching", "Giving information"),
    ] {
        terms.insert(record.code.clone(), record);
    }
    terms
}

#[test]
fn primary_terms_are_keyed_by_their_code() {
    let dir = tempdir().expect("temporary directory");
    let path = write_fixture(
        &dir.path().join("icnp.xlsx"),
        &[
            primary_row("A1", "Focus", "Pain", "Unpleasant sensation"),
            primary_row("B2", "Action", "Teaching", "Giving information"),
        ],
    );

    let terms = excel_read::read_terms(&path, false).expect("terms read");

    assert_eq!(terms.len(), 2);
    for (key, record) in &terms {
        assert_eq!(key, &record.code);
        assert_eq!(record.cross_reference_code, None);
    }
    assert_eq!(
        terms["A1"],
        TermRecord::new("A1", "Focus", "Pain", "Unpleasant sensation")
    );
}

#[test]
fn first_row_is_data_unless_header_skipping_is_enabled() {
    let dir = tempdir().expect("temporary directory");
    let path = write_fixture(
        &dir.path().join("icnp.xlsx"),
        &[
            primary_row("Code", "Axis", "Term", "Definition"),
            primary_row("A1", "Focus", "Pain", "Unpleasant sensation"),
        ],
    );

    let with_header = excel_read::read_terms(&path, false).expect("terms read");
    assert!(with_header.contains_key("Code"));
    assert_eq!(with_header.len(), 2);

    let without_header = excel_read::read_terms(&path, true).expect("terms read");
    assert!(!without_header.contains_key("Code"));
    assert_eq!(without_header.len(), 1);
}

#[test]
fn later_rows_replace_earlier_rows_with_the_same_code() {
    let dir = tempdir().expect("temporary directory");
    let path = write_fixture(
        &dir.path().join("icnp.xlsx"),
        &[
            primary_row("A1", "Focus", "Pain", "first"),
            vec![],
            primary_row("A1", "Focus", "Acute pain", "second"),
        ],
    );

    let terms = excel_read::read_terms(&path, false).expect("terms read");

    assert_eq!(terms.len(), 1);
    assert_eq!(terms["A1"].term, "Acute pain");
    assert_eq!(terms["A1"].definition, "second");
}

#[test]
fn numeric_cells_are_read_as_displayed() {
    let dir = tempdir().expect("temporary directory");
    let path = write_fixture(
        &dir.path().join("mapping.xlsx"),
        &[vec![
            Fixture::Text("A1"),
            Fixture::Blank,
            Fixture::Number(274663008.0),
        ]],
    );

    let rows = excel_read::read_cross_references(&path).expect("mapping read");

    assert_eq!(
        rows,
        vec![CrossReferenceRow {
            code: "A1".into(),
            cross_reference: "274663008".into(),
        }]
    );
}

#[test]
fn date_cells_are_read_as_displayed() {
    let dir = tempdir().expect("temporary directory");
    let path = write_fixture(
        &dir.path().join("mapping.xlsx"),
        &[
            vec![
                Fixture::Text("A1"),
                Fixture::Blank,
                Fixture::Formatted(44119.0, "yyyy-mm-dd"),
            ],
            vec![
                Fixture::Text("B2"),
                Fixture::Blank,
                Fixture::Formatted(44119.5, "yyyy-mm-dd hh:mm"),
            ],
        ],
    );

    let rows = excel_read::read_cross_references(&path).expect("mapping read");
    let values: Vec<&str> = rows.iter().map(|row| row.cross_reference.as_str()).collect();

    assert_eq!(values, vec!["2020-10-15", "2020-10-15 12:00:00"]);
}

#[test]
fn blank_cross_references_normalise_to_absent() {
    let mut terms = sample_terms();
    let rows = vec![
        CrossReferenceRow {
            code: "A1".into(),
            cross_reference: "274663008".into(),
        },
        CrossReferenceRow {
            code: "B2".into(),
            cross_reference: "   ".into(),
        },
    ];

    let report = enrich::apply_cross_references(&rows, &mut terms);

    assert_eq!(
        report,
        EnrichReport {
            rows: 2,
            matched: 2,
            unmatched: 0
        }
    );
    assert_eq!(terms["A1"].cross_reference_code.as_deref(), Some("274663008"));
    assert_eq!(terms["B2"].cross_reference_code, None);
}

#[test]
fn unknown_codes_are_counted_and_ignored() {
    let mut terms = sample_terms();
    let before = terms.clone();
    let rows = vec![CrossReferenceRow {
        code: "ZZ".into(),
        cross_reference: "12345".into(),
    }];

    let report = enrich::apply_cross_references(&rows, &mut terms);

    assert_eq!(report.unmatched, 1);
    assert_eq!(report.matched, 0);
    assert_eq!(terms, before);
}

#[test]
fn the_last_enrichment_pass_wins() {
    let dir = tempdir().expect("temporary directory");
    let diagnoses = write_fixture(
        &dir.path().join("diagnoses.xlsx"),
        &[mapping_row("A1", "111"), mapping_row("B2", "222")],
    );
    let interventions = write_fixture(
        &dir.path().join("interventions.xlsx"),
        &[mapping_row("A1", "333"), mapping_row("B2", "")],
    );
    let mut terms = sample_terms();

    enrich::enrich_from_file(&diagnoses, &mut terms).expect("diagnoses applied");
    enrich::enrich_from_file(&interventions, &mut terms).expect("interventions applied");

    assert_eq!(terms["A1"].cross_reference_code.as_deref(), Some("333"));
    assert_eq!(terms["B2"].cross_reference_code, None);
}

#[test]
fn enriching_twice_with_the_same_file_is_idempotent() {
    let dir = tempdir().expect("temporary directory");
    let diagnoses = write_fixture(
        &dir.path().join("diagnoses.xlsx"),
        &[
            mapping_row("ICNP", "SCT"),
            mapping_row("A1", "274663008"),
            mapping_row("B2", " "),
        ],
    );
    let mut terms = sample_terms();

    let first = enrich::enrich_from_file(&diagnoses, &mut terms).expect("first pass");
    let after_first = terms.clone();
    let second = enrich::enrich_from_file(&diagnoses, &mut terms).expect("second pass");

    assert_eq!(terms, after_first);
    assert_eq!(first, second);
    assert_eq!(first.unmatched, 1);
}

#[test]
fn unreadable_mapping_leaves_terms_untouched() {
    let dir = tempdir().expect("temporary directory");
    let mut terms = sample_terms();
    let before = terms.clone();

    let result = enrich::enrich_from_file(&dir.path().join("missing.xlsx"), &mut terms);

    assert!(result.is_err());
    assert_eq!(terms, before);
}

#[test]
fn missing_primary_table_is_fatal() {
    let dir = tempdir().expect("temporary directory");
    let mut config = Config::new(dir.path());
    config.json_output = dir.path().join("icnp.json");
    config.excel_output = dir.path().join("icnp-snomedct.xlsx");

    let error = pipeline::run(&config).expect_err("run must fail");

    assert!(matches!(error, ToolError::MissingInput(path) if path == config.primary_path()));
    assert!(!config.json_output.exists());
    assert!(!config.excel_output.exists());
}

#[test]
fn missing_mapping_file_follows_the_failure_policy() {
    let dir = tempdir().expect("temporary directory");
    let mut config = Config::new(dir.path());
    config.json_output = dir.path().join("icnp.json");
    config.excel_output = dir.path().join("icnp-snomedct.xlsx");
    write_fixture(
        &config.primary_path(),
        &[primary_row("A1", "Focus", "Pain", "Unpleasant sensation")],
    );
    write_fixture(&config.diagnoses_path(), &[mapping_row("A1", "274663008")]);

    let summary = pipeline::run(&config).expect("run succeeds");
    assert!(summary.diagnoses.is_some());
    assert!(summary.interventions.is_none());
    assert_eq!(summary.json_output.as_deref(), Some(config.json_output.as_path()));
    assert_eq!(summary.excel_output.as_deref(), Some(config.excel_output.as_path()));

    config.enrichment_failure = EnrichmentFailure::Abort;
    let error = pipeline::run(&config).expect_err("strict run fails");
    assert!(matches!(error, ToolError::ExcelRead(_)));
}

#[test]
fn end_to_end_merge_produces_both_exports() {
    let dir = tempdir().expect("temporary directory");
    let mut config = Config::new(dir.path());
    config.json_output = dir.path().join("out").join("icnp.json");
    config.excel_output = dir.path().join("icnp-snomedct.xlsx");
    std::fs::create_dir(dir.path().join("out")).expect("output directory");

    write_fixture(
        &config.primary_path(),
        &[primary_row("A1", "Focus", "Pain", "Unpleasant sensation")],
    );
    write_fixture(&config.diagnoses_path(), &[mapping_row("A1", "274663008")]);
    write_fixture(&config.interventions_path(), &[]);

    let summary = pipeline::run(&config).expect("run succeeds");
    assert_eq!(summary.term_count, 1);
    assert_eq!(summary.interventions, Some(EnrichReport::default()));

    let written = std::fs::read_to_string(&config.json_output).expect("JSON read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    assert_eq!(
        parsed,
        serde_json::json!([{
            "code": "A1",
            "axis": "Focus",
            "term": "Pain",
            "definition": "Unpleasant sensation",
            "crossReferenceCode": "274663008"
        }])
    );

    let mut workbook: Xlsx<_> = open_workbook(&config.excel_output).expect("workbook opened");
    assert_eq!(workbook.sheet_names().to_vec(), vec!["ICNP-SCT".to_string()]);
    let range = workbook
        .worksheet_range_at(0)
        .expect("first sheet")
        .expect("sheet read");
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["ICNP", "AXIS", "SCT", "TERM", "DEFINITION"],
            vec!["A1", "Focus", "274663008", "Pain", "Unpleasant sensation"],
        ]
    );

    let sheet_xml = read_package_part(&config.excel_output, "xl/worksheets/sheet1.xml");
    let rels = read_package_part(
        &config.excel_output,
        "xl/worksheets/_rels/sheet1.xml.rels",
    );
    assert!(sheet_xml.contains(r#"<hyperlink ref="A2""#));
    assert!(sheet_xml.contains(r#"<hyperlink ref="C2""#));
    // The ICNP link keeps its fragment in the sheet's location attribute.
    assert!(rels.contains(r#"Target="https://neuronsong.com//_/_sites/icnp-browser/""#));
    assert!(sheet_xml.contains(r#"location="/2019/concepts/no/A1""#));
    assert!(rels.contains(&snomed_url("274663008").replace('&', "&amp;")));
}
