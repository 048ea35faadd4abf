use crate::commands::shipment_processor;
use crate::config::{CliConfig, CsvOverrides};
use crate::error::CliResult;
use crate::SkipStage;
use std::path::PathBuf;

pub fn execute(
    file: PathBuf,
    skip: SkipStage,
    config: Option<PathBuf>,
    overrides: CsvOverrides,
) -> CliResult<()> {
    let config = overrides.apply(CliConfig::load(config.as_deref())?)?;
    let processor = shipment_processor(config.csv);

    println!("Reprocessing {} (ignoring {:?} errors)", file.display(), skip);
    let summary = match skip {
        SkipStage::Business => processor.reprocess_ignore_business(&file)?,
        SkipStage::Format => processor.reprocess_ignore_format(&file)?,
    };

    println!("Source: {}", summary.file_path.display());
    println!("Result: {}", summary.error_kind);
    println!("Valid rows: {}", summary.valid_row_count);
    println!("Error rows: {}", summary.error_row_count);
    Ok(())
}
