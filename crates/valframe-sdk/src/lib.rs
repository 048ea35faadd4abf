/*!
# Valframe SDK

Staged validation of delimited record files.

A file moves through three stages, each backed by pluggable validators held
in a [`ValidatorRegistry`]:

1. **File**: existence, extension, data rows, column set
2. **Format**: rows that failed type binding, annotated column by column
3. **Business**: cross-field rules over well-formed records

Clean rows land in `<base>_Output.csv`; each failing stage writes its own
error file next to the input. Every processed file yields one
[`FileSummary`].

## Usage

```rust,no_run
use valframe_csvs::{CsvConfig, Record};
use valframe_sdk::{FileProcessor, ValidatorRegistry};

async fn example<R: Record + Clone>(paths: &[&str]) {
    let registry = ValidatorRegistry::<R>::with_defaults().build();
    let processor = FileProcessor::new(registry, CsvConfig::default());

    for summary in processor.process_files(paths).await {
        println!("{}: {}", summary.file_name, summary.error_kind);
    }
}
```
*/

pub mod archive;
mod pipeline;
pub mod validators;

pub use archive::create_archive;
pub use pipeline::*;
pub use validators::{
    BusinessRuleValidator, CsvFileValidator, FileValidator, FormatValidator, RuleViolation,
    TypeFormatValidator, ValidationError, ValidatorRegistry, UNEXPLAINED_ROW,
};
