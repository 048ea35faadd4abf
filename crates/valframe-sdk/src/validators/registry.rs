use super::{
    BusinessRuleValidator, CsvFileValidator, FileValidator, FormatValidator, RuleViolation,
    TypeFormatValidator, ValidationError,
};
use crate::PipelineResult;
use std::path::Path;
use tracing::debug;
use valframe_csvs::{CsvConfig, QuarantineEntry, Record};

/// Description of a quarantined row that no format validator flagged.
pub const UNEXPLAINED_ROW: &str = "Row could not be read";

/// Validator implementations grouped by role.
///
/// Each role may hold any number of implementations, including none, in
/// which case the role's stage reports nothing. Within a role,
/// implementations run in name order, so aggregate results do not depend on
/// registration order.
pub struct ValidatorRegistry<R: Record> {
    file: Vec<Box<dyn FileValidator<R>>>,
    format: Vec<Box<dyn FormatValidator<R>>>,
    business: Vec<Box<dyn BusinessRuleValidator<R>>>,
}

impl<R: Record> ValidatorRegistry<R> {
    pub fn builder() -> ValidatorRegistryBuilder<R> {
        ValidatorRegistryBuilder {
            file: Vec::new(),
            format: Vec::new(),
            business: Vec::new(),
        }
    }

    /// Builder preloaded with the built-in file and format validators.
    pub fn with_defaults() -> ValidatorRegistryBuilder<R> {
        Self::builder()
            .file(CsvFileValidator)
            .format(TypeFormatValidator::<R>::new())
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.format.is_empty() && self.business.is_empty()
    }

    /// Run every file-level validator and concatenate their findings.
    pub fn run_file_stage(
        &self,
        path: &Path,
        config: &CsvConfig,
    ) -> PipelineResult<Vec<ValidationError>> {
        let mut errors = Vec::new();
        for validator in &self.file {
            let found = validator.validate(path, config)?;
            debug!(validator = validator.name(), errors = found.len(), "File validator ran");
            errors.extend(found);
        }
        Ok(errors)
    }

    /// Annotate quarantined rows with every format finding.
    ///
    /// Returns every quarantined row, in quarantine order, with its
    /// description set. A row no validator explains is described with
    /// [`UNEXPLAINED_ROW`] rather than dropped.
    pub fn run_format_stage(&self, quarantine: Vec<QuarantineEntry>) -> Vec<QuarantineEntry> {
        let violations: Vec<RuleViolation> = self
            .format
            .iter()
            .flat_map(|validator| validator.validate(&quarantine))
            .collect();
        let notes = group_by_row(violations, quarantine.len());

        quarantine
            .into_iter()
            .zip(notes)
            .map(|(mut entry, notes)| {
                entry.description = if notes.is_empty() {
                    UNEXPLAINED_ROW.to_string()
                } else {
                    notes.join(";")
                };
                entry
            })
            .collect()
    }

    /// Run every business validator, append each violation to its record's
    /// description and return copies of the records that end up flagged.
    ///
    /// Records are never removed or reordered, and existing descriptions are
    /// kept.
    pub fn run_business_stage(&self, records: &mut [R]) -> Vec<R>
    where
        R: Clone,
    {
        let view: &[R] = records;
        let violations: Vec<RuleViolation> = self
            .business
            .iter()
            .flat_map(|validator| validator.validate(view))
            .collect();
        let notes = group_by_row(violations, records.len());

        for (record, notes) in records.iter_mut().zip(notes) {
            for note in notes {
                record.append_description(&note);
                record.append_description(";");
            }
        }

        records.iter().filter(|r| !r.is_clean()).cloned().collect()
    }
}

/// Bucket violations by row; out-of-range rows are dropped.
fn group_by_row(violations: Vec<RuleViolation>, rows: usize) -> Vec<Vec<String>> {
    let mut notes = vec![Vec::new(); rows];
    for violation in violations {
        if let Some(bucket) = notes.get_mut(violation.row) {
            bucket.push(violation.message);
        }
    }
    notes
}

pub struct ValidatorRegistryBuilder<R: Record> {
    file: Vec<Box<dyn FileValidator<R>>>,
    format: Vec<Box<dyn FormatValidator<R>>>,
    business: Vec<Box<dyn BusinessRuleValidator<R>>>,
}

impl<R: Record> ValidatorRegistryBuilder<R> {
    pub fn file(mut self, validator: impl FileValidator<R> + 'static) -> Self {
        self.file.push(Box::new(validator));
        self
    }

    pub fn format(mut self, validator: impl FormatValidator<R> + 'static) -> Self {
        self.format.push(Box::new(validator));
        self
    }

    pub fn business(mut self, validator: impl BusinessRuleValidator<R> + 'static) -> Self {
        self.business.push(Box::new(validator));
        self
    }

    pub fn build(mut self) -> ValidatorRegistry<R> {
        self.file.sort_by(|a, b| a.name().cmp(b.name()));
        self.format.sort_by(|a, b| a.name().cmp(b.name()));
        self.business.sort_by(|a, b| a.name().cmp(b.name()));

        ValidatorRegistry {
            file: self.file,
            format: self.format,
            business: self.business,
        }
    }
}
