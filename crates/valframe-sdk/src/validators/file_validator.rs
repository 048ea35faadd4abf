use super::{FileValidator, ValidationError};
use crate::PipelineResult;
use std::fs;
use std::path::Path;
use tracing::debug;
use valframe_csvs::{CsvConfig, Record, RecordStream, DESCRIPTION_COLUMN};

pub const KIND_ERROR: &str = "Error";
pub const KIND_EXTENSION: &str = "Extension Not Supported";
pub const KIND_ONLY_HEADER: &str = "Only Header";
pub const KIND_EXTRA_COLUMNS: &str = "Extra Columns";
pub const KIND_MISSING_COLUMNS: &str = "Missing Columns";

/// Structural checks for delimited files.
///
/// Every applicable check runs. Checks that read the file are skipped when
/// the file is missing or empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFileValidator;

impl<R: Record> FileValidator<R> for CsvFileValidator {
    fn name(&self) -> &str {
        "csv-file"
    }

    fn validate(&self, path: &Path, config: &CsvConfig) -> PipelineResult<Vec<ValidationError>> {
        let mut errors = Vec::new();

        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => {
                errors.push(ValidationError::new(KIND_ERROR, "File does not exist"));
                return Ok(errors);
            }
        };

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if !extension.eq_ignore_ascii_case("csv") {
            let shown = if extension.is_empty() {
                String::new()
            } else {
                format!(".{extension}")
            };
            errors.push(ValidationError::new(KIND_EXTENSION, shown));
        }

        if metadata.len() == 0 {
            errors.push(ValidationError::new(KIND_ERROR, "File is empty"));
            return Ok(errors);
        }

        let mut stream = RecordStream::<R, _>::open(path, config)?;
        if !stream.has_records()? {
            errors.push(ValidationError::new(KIND_ONLY_HEADER, "File does not have data!"));
        }

        let schema = R::schema();
        let columns = stream.normalized_columns();

        let extra: Vec<&str> = columns
            .iter()
            .filter(|column| !column.eq_ignore_ascii_case(DESCRIPTION_COLUMN))
            .filter(|column| schema.field(column).is_none())
            .map(String::as_str)
            .collect();
        if !extra.is_empty() {
            errors.push(ValidationError::new(KIND_EXTRA_COLUMNS, extra.join(",")));
        }

        let missing: Vec<&str> = schema
            .fields()
            .iter()
            .filter(|field| !field.is_ignored())
            .filter(|field| !columns.iter().any(|column| field.matches(column)))
            .map(|field| field.name())
            .collect();
        if !missing.is_empty() {
            errors.push(ValidationError::new(KIND_MISSING_COLUMNS, missing.join(",")));
        }

        debug!(path = %path.display(), errors = errors.len(), "File checks complete");
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use tempfile::TempDir;
    use valframe_csvs::{RecordMeta, Schema};

    #[derive(Debug, Default)]
    struct Route {
        origin: String,
        destination: String,
        pickup_date: chrono::NaiveDateTime,
        weight: i32,
        meta: RecordMeta,
    }

    impl Record for Route {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Route>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .text("Origin", |r: &Route| r.origin.as_str(), |r, v| r.origin = v)
                    .text("Destination", |r: &Route| r.destination.as_str(), |r, v| {
                        r.destination = v
                    })
                    .date_time("PickupDate", |r: &Route| r.pickup_date, |r, v| r.pickup_date = v)
                    .int32("Weight", |r: &Route| r.weight, |r, v| r.weight = v)
                    .build()
            })
        }

        fn meta(&self) -> &RecordMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    }

    fn check(dir: &TempDir, name: &str, contents: Option<&str>) -> Vec<ValidationError> {
        let path = dir.path().join(name);
        if let Some(contents) = contents {
            fs::write(&path, contents).unwrap();
        }
        <CsvFileValidator as FileValidator<Route>>::validate(
            &CsvFileValidator,
            &path,
            &CsvConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_well_formed_file_has_no_errors() {
        let dir = TempDir::new().unwrap();
        let errors = check(
            &dir,
            "routes.csv",
            Some("Origin,Destination,Pickup Date,Weight\r\nABL,CGO,2024-01-01,5\r\n"),
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let errors = check(&dir, "absent.csv", None);
        assert_eq!(errors, vec![ValidationError::new("Error", "File does not exist")]);
    }

    #[test]
    fn test_empty_file_skips_content_checks() {
        let dir = TempDir::new().unwrap();
        let errors = check(&dir, "empty.csv", Some(""));
        assert_eq!(errors, vec![ValidationError::new("Error", "File is empty")]);
    }

    #[test]
    fn test_all_findings_are_reported_together() {
        let dir = TempDir::new().unwrap();
        let errors = check(&dir, "routes.txt", Some("Origin,Destination,PickupDate,Carrier\r\n"));
        assert_eq!(
            errors,
            vec![
                ValidationError::new("Extension Not Supported", ".txt"),
                ValidationError::new("Only Header", "File does not have data!"),
                ValidationError::new("Extra Columns", "Carrier"),
                ValidationError::new("Missing Columns", "Weight"),
            ]
        );
    }

    #[test]
    fn test_extension_check_ignores_case() {
        let dir = TempDir::new().unwrap();
        let errors = check(
            &dir,
            "ROUTES.CSV",
            Some("Origin,Destination,PickupDate,Weight\nABL,CGO,2024-01-01,5\n"),
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_description_column_is_not_extra() {
        let dir = TempDir::new().unwrap();
        let errors = check(
            &dir,
            "routes.csv",
            Some("Origin,Destination,PickupDate,Weight,Description\r\nABL,CGO,2024-01-01,5,\r\n"),
        );
        assert!(errors.is_empty(), "{errors:?}");
    }
}
