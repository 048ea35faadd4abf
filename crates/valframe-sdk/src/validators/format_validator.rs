use super::{FormatValidator, RuleViolation};
use std::marker::PhantomData;
use valframe_csvs::{QuarantineEntry, Record};

/// Re-runs each field's conversion over quarantined rows and names every
/// column that is blank or not of its declared type.
///
/// Produces one violation per row, e.g.
/// `Null or Empty - Weight;Pickup Date-DateTime Data type`.
pub struct TypeFormatValidator<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R> TypeFormatValidator<R> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<R> Default for TypeFormatValidator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> TypeFormatValidator<R> {
    /// Description for a single quarantined row; empty when nothing is wrong.
    ///
    /// Every column bound to a schema field is checked, in column order, so
    /// a field repeated in the header is checked once per occurrence.
    pub fn describe(entry: &QuarantineEntry) -> String {
        let mut notes = Vec::new();
        for value in &entry.values {
            let Some(field_type) = value.field_type else {
                continue;
            };

            if value.is_blank() {
                notes.push(format!("Null or Empty - {}", value.header));
            } else if field_type.check(value.value.as_deref()).is_err() {
                notes.push(format!("{}-{} Data type", value.header, field_type));
            }
        }
        notes.join(";")
    }
}

impl<R: Record> FormatValidator<R> for TypeFormatValidator<R> {
    fn name(&self) -> &str {
        "type-format"
    }

    fn validate(&self, quarantine: &[QuarantineEntry]) -> Vec<RuleViolation> {
        quarantine
            .iter()
            .enumerate()
            .filter_map(|(row, entry)| {
                let description = Self::describe(entry);
                (!description.is_empty()).then(|| RuleViolation::new(row, description))
            })
            .collect()
    }
}
