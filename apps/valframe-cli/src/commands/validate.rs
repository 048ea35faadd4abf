use crate::commands::shipment_processor;
use crate::config::{CliConfig, CsvOverrides};
use crate::error::CliResult;
use std::path::PathBuf;
use tracing::info;
use valframe_sdk::FileSummary;

pub async fn execute(
    files: Vec<PathBuf>,
    config: Option<PathBuf>,
    overrides: CsvOverrides,
    json: bool,
) -> CliResult<()> {
    let config = overrides.apply(CliConfig::load(config.as_deref())?)?;
    info!(files = files.len(), "Validating");

    let processor = shipment_processor(config.csv);
    let summaries = processor.process_files(&files).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_table(&summaries);
    }

    Ok(())
}

fn print_table(summaries: &[FileSummary]) {
    let width = summaries
        .iter()
        .map(|s| s.file_name.len())
        .max()
        .unwrap_or(0)
        .max("File".len());

    println!(
        "{:<width$}  {:<19}  {:>6}  {:>6}  Reprocessable",
        "File", "Result", "Valid", "Errors"
    );
    for summary in summaries {
        println!(
            "{:<width$}  {:<19}  {:>6}  {:>6}  {}",
            summary.file_name,
            summary.error_kind,
            summary.valid_row_count,
            summary.error_row_count,
            if summary.reprocessable { "yes" } else { "no" },
        );
    }

    let failed = summaries.iter().filter(|s| s.has_errors()).count();
    println!();
    println!("{} file(s), {} with errors", summaries.len(), failed);
}
