use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use valframe_csvs::CsvConfig;

/// Contents of the optional `--config` YAML file.
///
/// ```yaml
/// csv:
///   field_separator: ";"
///   text_qualifier: "'"
/// archive_dir: ./archives
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub csv: CsvConfig,

    /// Where `archive` writes when `--out-dir` is not given
    pub archive_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Load `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::from_yaml(&fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> CliResult<()> {
        let csv = &self.csv;
        if csv.field_separator == csv.text_qualifier {
            return Err(CliError::InvalidConfig(format!(
                "field separator and text qualifier are both '{}'",
                csv.field_separator
            )));
        }
        if csv.end_of_line.is_empty() {
            return Err(CliError::InvalidConfig("end_of_line is empty".to_string()));
        }
        Ok(())
    }
}

/// Codec flags given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct CsvOverrides {
    pub separator: Option<char>,
    pub qualifier: Option<char>,
    pub header: Option<String>,
}

impl CsvOverrides {
    pub fn apply(self, config: CliConfig) -> CliResult<CliConfig> {
        let csv = CsvConfig {
            field_separator: self.separator.unwrap_or(config.csv.field_separator),
            text_qualifier: self.qualifier.unwrap_or(config.csv.text_qualifier),
            header: self.header.or(config.csv.header),
            ..config.csv
        };
        let merged = CliConfig { csv, ..config };
        merged.check()?;
        Ok(merged)
    }
}
