use std::path::PathBuf;

use bifrost_terminology::config::{
    Config, DEFAULT_CONFIG_FILE, DEFAULT_EXCEL_OUTPUT, DEFAULT_JSON_OUTPUT, EnrichmentFailure,
};
use bifrost_terminology::pipeline::{self, RunSummary};
use bifrost_terminology::{Result, ToolError};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level.as_deref())?;

    let mut config = Config::load(&cli.config)?;
    config.json_output = cli.json_output;
    config.excel_output = cli.excel_output;
    config.skip_header = cli.skip_header;
    if cli.strict_enrichment {
        config.enrichment_failure = EnrichmentFailure::Abort;
    }

    let summary = pipeline::run(&config)?;
    report(&summary);
    Ok(())
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .map_err(|err| ToolError::Logging(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn report(summary: &RunSummary) {
    info!(term_count = summary.term_count, "merge finished");
    match &summary.json_output {
        Some(path) => info!(output = %path.display(), "JSON written"),
        None => warn!("JSON export missing"),
    }
    match &summary.excel_output {
        Some(path) => info!(output = %path.display(), "spreadsheet written"),
        None => warn!("spreadsheet export missing"),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge the ICNP terminology with its SNOMED CT mappings and export it as JSON and Excel."
)]
struct Cli {
    /// Properties file providing the `root` input directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// JSON output file, relative to the working directory.
    #[arg(long, default_value = DEFAULT_JSON_OUTPUT)]
    json_output: PathBuf,

    /// Excel output file, relative to the working directory.
    #[arg(long, default_value = DEFAULT_EXCEL_OUTPUT)]
    excel_output: PathBuf,

    /// Ignore the first row of the ICNP table.
    #[arg(long)]
    skip_header: bool,

    /// Abort when a SNOMED CT mapping file cannot be read.
    #[arg(long)]
    strict_enrichment: bool,

    /// Tracing filter, e.g. `debug` or `bifrost_terminology=trace`. Overrides `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}
