/*!
# Valframe CSV Codec

Delimited-text reading and writing for strongly-typed records.

## Purpose

This crate is the **data boundary** of the validation framework:

- **Readers** turn delimited text into typed records, diverting rows that do
  not bind into a quarantine list
- **Writers** turn typed records (or quarantined rows) back into delimited text
- **Schemas** describe, per record type, which columns exist and how each one
  is converted

## Format

- Configurable field separator and text qualifier (defaults `,` and `"`)
- A qualified field may contain separators, line breaks and doubled qualifiers
- The header row defines the columns; it can be overridden by configuration
- Column names are matched case-insensitively with whitespace removed

## Usage

```rust,no_run
use valframe_csvs::{CsvConfig, CsvResult, Record, RecordStream, RowLayout, write_csv};
use std::path::Path;

fn example<R: Record>() -> CsvResult<()> {
    let config = CsvConfig::default();
    let mut stream = RecordStream::<R, _>::open(Path::new("shipments.csv"), &config)?;
    let records = stream.read_all()?;
    println!("{} rows quarantined", stream.quarantine().len());

    write_csv(Path::new("out/shipments"), &records, RowLayout::for_records(None), &config)?;
    Ok(())
}
```
*/

pub mod config;
pub mod errors;
pub mod quarantine;
pub mod reader;
pub mod schema;
pub mod tokenizer;
pub mod writer;

// Re-export main types for convenience
pub use config::{normalize_column, CsvConfig};
pub use errors::{ConversionError, CsvError, CsvResult};
pub use quarantine::{QuarantineEntry, QuarantinedValue};
pub use reader::{read_csv, RecordStream};
pub use schema::{
    Field, FieldType, Record, RecordMeta, Schema, SchemaBuilder, DATE_TIME_FORMAT,
    DESCRIPTION_COLUMN,
};
pub use writer::{csv_destination, quote_field, write_csv, CsvWriter, Getter, RowLayout};
