use crate::validators::ValidationError;
use crate::PipelineResult;
use std::path::{Path, PathBuf};
use tracing::info;
use valframe_csvs::{
    normalize_column, write_csv, CsvConfig, QuarantineEntry, Record, RowLayout, DESCRIPTION_COLUMN,
};

/// Sibling files produced for one input file, named after its base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
    base: String,
}

impl OutputPaths {
    pub fn for_input(path: &Path) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { dir, base }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.base, suffix))
    }

    /// Clean rows.
    pub fn output(&self) -> PathBuf {
        self.sibling("_Output.csv")
    }

    pub fn file_errors(&self) -> PathBuf {
        self.sibling("_Error.csv")
    }

    pub fn format_errors(&self) -> PathBuf {
        self.sibling("Format_Error.csv")
    }

    pub fn business_errors(&self) -> PathBuf {
        self.sibling("Business_Error.csv")
    }

    /// Clean rows written by the reprocess workflows.
    pub fn error_omitted_output(&self) -> PathBuf {
        self.sibling("_ErrorOmittedOutput.csv")
    }
}

fn is_description(column: &str) -> bool {
    normalize_column(column).eq_ignore_ascii_case(DESCRIPTION_COLUMN)
}

/// Columns of a clean output file: the source columns without `Description`.
pub fn output_columns(columns: &[String]) -> Vec<String> {
    columns.iter().filter(|c| !is_description(c)).cloned().collect()
}

/// Columns of a row-level error file: the source columns plus `Description`.
pub fn error_columns(columns: &[String]) -> Vec<String> {
    let mut columns = output_columns(columns);
    columns.push(DESCRIPTION_COLUMN.to_string());
    columns
}

pub fn write_records<'a, R, I>(
    path: &Path,
    records: I,
    columns: Vec<String>,
    config: &CsvConfig,
) -> PipelineResult<usize>
where
    R: Record,
    I: IntoIterator<Item = &'a R>,
{
    let written = write_csv(path, records, RowLayout::for_records(Some(columns.as_slice())), config)?;
    info!(path = %path.display(), rows = written, "Wrote records");
    Ok(written)
}

pub fn write_file_errors(
    path: &Path,
    errors: &[ValidationError],
    config: &CsvConfig,
) -> PipelineResult<usize> {
    let written = write_csv(path, errors, ValidationError::layout(), config)?;
    info!(path = %path.display(), rows = written, "Wrote file errors");
    Ok(written)
}

pub fn write_format_errors(
    path: &Path,
    entries: &[QuarantineEntry],
    columns: &[String],
    config: &CsvConfig,
) -> PipelineResult<usize> {
    let layout = RowLayout::for_quarantine(&error_columns(columns));
    let written = write_csv(path, entries, layout, config)?;
    info!(path = %path.display(), rows = written, "Wrote format errors");
    Ok(written)
}
