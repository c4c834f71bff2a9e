use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bifrost::terminology::error::{Result, ToolError};

/// Properties file read when no other path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.properties";
/// Key holding the directory of the three input workbooks.
pub const ROOT_KEY: &str = "root";
pub const PRIMARY_KEY: &str = "primary";
pub const DIAGNOSES_KEY: &str = "diagnoses";
pub const INTERVENTIONS_KEY: &str = "interventions";

pub const DEFAULT_PRIMARY_FILE: &str = "norsk_icnp_2019.xlsx";
pub const DEFAULT_DIAGNOSES_FILE: &str = "ICNP-SCT Mapping-Diagnoses 2019.xlsx";
pub const DEFAULT_INTERVENTIONS_FILE: &str = "ICNP-SCT Mapping-Interventions 2019.xlsx";
pub const DEFAULT_JSON_OUTPUT: &str = "icnp.json";
pub const DEFAULT_EXCEL_OUTPUT: &str = "icnp-snomedct.xlsx";

/// What the pipeline does when an auxiliary mapping workbook cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnrichmentFailure {
    /// Log the failure and keep going with the terms unchanged.
    #[default]
    Warn,
    /// Stop the run.
    Abort,
}

/// Settings for a single merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory containing the input workbooks.
    pub root: PathBuf,
    pub primary_file: String,
    pub diagnoses_file: String,
    pub interventions_file: String,
    /// JSON export, resolved against the working directory.
    pub json_output: PathBuf,
    /// Spreadsheet export, resolved against the working directory.
    pub excel_output: PathBuf,
    /// Treat the first row of the primary table as a header.
    pub skip_header: bool,
    pub enrichment_failure: EnrichmentFailure,
}

impl Config {
    /// Builds a configuration with the default file names under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            primary_file: DEFAULT_PRIMARY_FILE.to_string(),
            diagnoses_file: DEFAULT_DIAGNOSES_FILE.to_string(),
            interventions_file: DEFAULT_INTERVENTIONS_FILE.to_string(),
            json_output: PathBuf::from(DEFAULT_JSON_OUTPUT),
            excel_output: PathBuf::from(DEFAULT_EXCEL_OUTPUT),
            skip_header: false,
            enrichment_failure: EnrichmentFailure::default(),
        }
    }

    /// Reads the properties file at `path` and builds a configuration from it.
    ///
    /// The `root` key is mandatory. `primary`, `diagnoses` and `interventions`
    /// optionally override the input file names.
    pub fn load(path: &Path) -> Result<Self> {
        let properties = Properties::load(path)?;
        Self::from_properties(&properties)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let root = properties
            .get(ROOT_KEY)
            .ok_or_else(|| ToolError::MissingProperty {
                path: properties.source().to_path_buf(),
                key: ROOT_KEY.to_string(),
            })?;
        if root.trim().is_empty() {
            return Err(ToolError::InvalidProperty {
                path: properties.source().to_path_buf(),
                line: properties.line_of(ROOT_KEY).unwrap_or_default(),
                message: format!("'{ROOT_KEY}' must not be empty"),
            });
        }

        let mut config = Config::new(root);
        if let Some(name) = properties.get(PRIMARY_KEY) {
            config.primary_file = name.to_string();
        }
        if let Some(name) = properties.get(DIAGNOSES_KEY) {
            config.diagnoses_file = name.to_string();
        }
        if let Some(name) = properties.get(INTERVENTIONS_KEY) {
            config.interventions_file = name.to_string();
        }
        info!(root = %config.root.display(), "configuration loaded");
        Ok(config)
    }

    pub fn primary_path(&self) -> PathBuf {
        self.root.join(&self.primary_file)
    }

    pub fn diagnoses_path(&self) -> PathBuf {
        self.root.join(&self.diagnoses_file)
    }

    pub fn interventions_path(&self) -> PathBuf {
        self.root.join(&self.interventions_file)
    }
}

/// Key/value pairs read from a Java-style `.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    source: PathBuf,
    entries: BTreeMap<String, (usize, String)>,
}

impl Properties {
    /// Loads and parses the file. A missing file is reported as
    /// [`ToolError::MissingConfig`].
    ///
    /// The file is read as UTF-8 when it is valid UTF-8 and as ISO-8859-1
    /// otherwise, the encoding `java.util.Properties` reads by default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingConfig(path.to_path_buf()));
        }
        let source = decode(fs::read(path)?);
        let properties = Self::parse(path, &source)?;
        debug!(
            path = %path.display(),
            key_count = properties.entries.len(),
            "parsed properties"
        );
        Ok(properties)
    }

    /// Parses `key=value`, `key: value` and `key value` lines. Lines starting
    /// with `#` or `!` are comments. A line ending in an odd number of
    /// backslashes continues on the next line. Values may use `\uXXXX`
    /// escapes. Later keys replace earlier ones.
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut lines = source.lines().enumerate();

        while let Some((index, raw)) = lines.next() {
            let line = raw.trim_start();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while continues(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }

            let invalid = |message: String| ToolError::InvalidProperty {
                path: path.to_path_buf(),
                line: index + 1,
                message,
            };
            let (key, value) = split_entry(logical.trim_end());
            let key = unescape(key).map_err(invalid)?;
            let value = unescape(value).map_err(invalid)?;
            entries.insert(key, (index + 1, value));
        }

        Ok(Self {
            source: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|(_, value)| value.as_str())
    }

    /// One-based line the key was read from.
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.entries.get(key).map(|(line, _)| *line)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| err.into_bytes().into_iter().map(char::from).collect())
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|ch| *ch == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                return (line[..idx].trim_end(), line[idx + 1..].trim_start());
            }
            ch if ch.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..idx], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut buf = [0u16; 2];
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        let decoded = if ch == '\\' {
            match chars.next() {
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\u{000c}',
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 || !hex.chars().all(|digit| digit.is_ascii_hexdigit()) {
                        return Err(format!("malformed \\uxxxx escape '\\u{hex}'"));
                    }
                    units.push(u16::from_str_radix(&hex, 16).map_err(|err| err.to_string())?);
                    continue;
                }
                Some(other) => other,
                None => continue,
            }
        } else {
            ch
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).map_err(|_| "unpaired surrogate in \\u escape".to_string())
}
