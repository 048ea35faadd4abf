/*!
# Validator Roles

Three pluggable roles, one per pipeline stage:

- [`FileValidator`]: facts about the file as a whole (existence, extension,
  column set)
- [`FormatValidator`]: per-row findings over quarantined rows only
- [`BusinessRuleValidator`]: cross-field rules over well-formed records

Implementations are registered explicitly in a [`ValidatorRegistry`] and must
not keep state between files; a registry is shared across concurrent file
tasks.
*/

mod file_validator;
mod format_validator;
mod registry;

use crate::PipelineResult;
use serde::Serialize;
use std::path::Path;
use valframe_csvs::{CsvConfig, Getter, QuarantineEntry, Record, RowLayout};

pub use {
    file_validator::CsvFileValidator,
    format_validator::TypeFormatValidator,
    registry::{ValidatorRegistry, ValidatorRegistryBuilder, UNEXPLAINED_ROW},
};

/// Column names of file-stage error reports.
pub const FILE_ERROR_COLUMNS: [&str; 2] = ["ErrorType", "Description"];

/// A fact about a file, not about any row in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ValidationError {
    pub kind: String,
    pub description: String,
}

impl ValidationError {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
        }
    }

    /// Writer layout producing `ErrorType,Description` rows.
    pub fn layout() -> RowLayout<ValidationError> {
        let [kind, description] = FILE_ERROR_COLUMNS;
        let kind_getter: Getter<ValidationError> = Box::new(|e: &ValidationError| e.kind.clone());
        let description_getter: Getter<ValidationError> =
            Box::new(|e: &ValidationError| e.description.clone());
        RowLayout::from_pairs([(kind, kind_getter), (description, description_getter)])
    }
}

/// One finding against one row of the slice a validator was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleViolation {
    /// Index into the validated slice
    pub row: usize,
    pub message: String,
}

impl RuleViolation {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

// ================================================================================================
// Roles
// ================================================================================================

pub trait FileValidator<R: Record>: Send + Sync {
    /// Identifies the validator; the registry orders implementations by name.
    fn name(&self) -> &str;

    /// Inspect the file at `path`.
    ///
    /// Findings are returned as data. An `Err` is reserved for faults that
    /// make the file unprocessable (configuration or I/O).
    fn validate(&self, path: &Path, config: &CsvConfig) -> PipelineResult<Vec<ValidationError>>;
}

pub trait FormatValidator<R: Record>: Send + Sync {
    fn name(&self) -> &str;

    /// Inspect rows that failed binding. Never sees well-formed records.
    fn validate(&self, quarantine: &[QuarantineEntry]) -> Vec<RuleViolation>;
}

pub trait BusinessRuleValidator<R: Record>: Send + Sync {
    fn name(&self) -> &str;

    /// Inspect the full record set. Violations are appended to the
    /// offending record's description by the registry.
    fn validate(&self, records: &[R]) -> Vec<RuleViolation>;
}
