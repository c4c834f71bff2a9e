use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument};

use crate::bifrost::terminology::config::{Config, EnrichmentFailure};
use crate::bifrost::terminology::enrich::{self, EnrichReport};
use crate::bifrost::terminology::error::{Result, ToolError};
use crate::bifrost::terminology::io::{excel_read, excel_write, json};
use crate::bifrost::terminology::layout::build_sheet;
use crate::bifrost::terminology::model::TermMap;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub term_count: usize,
    /// `None` when the diagnoses mapping could not be read.
    pub diagnoses: Option<EnrichReport>,
    /// `None` when the interventions mapping could not be read.
    pub interventions: Option<EnrichReport>,
    /// Path of the JSON export, `None` if writing it failed.
    pub json_output: Option<PathBuf>,
    /// Path of the spreadsheet export, `None` if writing it failed.
    pub excel_output: Option<PathBuf>,
}

/// Loads, enriches, and exports the terminology described by `config`.
///
/// A missing or unreadable primary table stops the run before anything is
/// written. Mapping failures follow [`Config::enrichment_failure`]; export
/// failures are logged and leave the other export unaffected.
#[instrument(level = "info", skip_all, fields(root = %config.root.display()))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let mut terms = load_primary(&config.primary_path(), config.skip_header)?;

    let diagnoses = enrich_or_skip(&config.diagnoses_path(), &mut terms, config)?;
    let interventions = enrich_or_skip(&config.interventions_path(), &mut terms, config)?;

    let json_output = write_output(&config.json_output, "JSON", |path| export_json(path, &terms));
    let excel_output = write_output(&config.excel_output, "spreadsheet", |path| {
        export_excel(path, &terms)
    });

    Ok(RunSummary {
        term_count: terms.len(),
        diagnoses,
        interventions,
        json_output,
        excel_output,
    })
}

/// Reads the primary ICNP table. Fails with [`ToolError::MissingInput`] before
/// opening anything when the file does not exist.
#[instrument(level = "info", fields(input = %path.display()))]
pub fn load_primary(path: &Path, skip_header: bool) -> Result<TermMap> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    excel_read::read_terms(path, skip_header)
}

fn enrich_or_skip(
    path: &Path,
    terms: &mut TermMap,
    config: &Config,
) -> Result<Option<EnrichReport>> {
    match enrich::enrich_from_file(path, terms) {
        Ok(report) => Ok(Some(report)),
        Err(err) if config.enrichment_failure == EnrichmentFailure::Warn => {
            error!(input = %path.display(), error = %err, "skipping cross-reference file");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn write_output(
    output: &Path,
    kind: &str,
    export: impl FnOnce(&Path) -> Result<()>,
) -> Option<PathBuf> {
    let written = resolve_output(output).and_then(|path| {
        export(&path)?;
        Ok(path)
    });
    match written {
        Ok(path) => Some(path),
        Err(err) => {
            error!(output = %output.display(), error = %err, "{kind} export failed");
            None
        }
    }
}

/// Writes the JSON export.
#[instrument(level = "info", skip(terms), fields(output = %output.display()))]
pub fn export_json(output: &Path, terms: &TermMap) -> Result<()> {
    json::write_terms_json(output, terms)?;
    info!(term_count = terms.len(), "wrote JSON export");
    Ok(())
}

/// Writes the hyperlinked ICNP-SCT workbook.
#[instrument(level = "info", skip(terms), fields(output = %output.display()))]
pub fn export_excel(output: &Path, terms: &TermMap) -> Result<()> {
    let table = build_sheet(terms);
    debug!(row_count = table.rows.len(), "sheet laid out");
    excel_write::write_sheet(output, &table)?;
    info!(term_count = terms.len(), "wrote spreadsheet export");
    Ok(())
}

/// Joins a relative output path onto the working directory. Absolute paths are
/// returned unchanged.
pub fn resolve_output(output: &Path) -> Result<PathBuf> {
    Ok(env::current_dir()?.join(output))
}
