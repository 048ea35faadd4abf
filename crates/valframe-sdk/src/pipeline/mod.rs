/*!
# Validation Pipeline

Runs one file through the staged checks and writes the resulting files.

## States

`Start → FileChecked → Parsed → FormatChecked → BusinessChecked → Finalized`

- File-stage errors jump straight to `Finalized`; nothing is parsed.
- Format-stage errors jump to `Finalized` as well; business rules are not run.
- `Finalized` partitions the records, writes the clean `_Output.csv` and one
  error file per failing stage, and produces the [`FileSummary`].

Each state is entered at most once per run. Stage findings are data; only
configuration and I/O faults surface as [`PipelineError`].
*/

mod file_summary;
mod pipeline_error;
mod reporting;

use crate::validators::{ValidationError, ValidatorRegistry};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use valframe_csvs::{CsvConfig, QuarantineEntry, Record, RecordStream};

pub use {
    file_summary::{ErrorKind, FileSummary},
    pipeline_error::{PipelineError, PipelineResult},
    reporting::{
        error_columns, output_columns, write_file_errors, write_format_errors, write_records,
        OutputPaths,
    },
};

/// Position of a file in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    FileChecked,
    Parsed,
    FormatChecked,
    BusinessChecked,
    Finalized,
}

/// Runs the pipeline for files of record type `R`.
///
/// Cheap to clone; clones share the validator registry.
pub struct FileProcessor<R: Record> {
    registry: Arc<ValidatorRegistry<R>>,
    config: CsvConfig,
}

impl<R: Record> Clone for FileProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
        }
    }
}

impl<R: Record + Clone> FileProcessor<R> {
    pub fn new(registry: ValidatorRegistry<R>, config: CsvConfig) -> Self {
        Self::with_shared_registry(Arc::new(registry), config)
    }

    pub fn with_shared_registry(registry: Arc<ValidatorRegistry<R>>, config: CsvConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    pub fn registry(&self) -> &ValidatorRegistry<R> {
        &self.registry
    }

    /// Run every stage for one file.
    pub fn process_file(&self, path: &Path) -> PipelineResult<FileSummary> {
        let mut run = FileRun::new(self, path);
        let mut state = PipelineState::Start;
        while state != PipelineState::Finalized {
            let next = run.advance(state)?;
            debug!(path = %path.display(), from = ?state, to = ?next, "Pipeline transition");
            state = next;
        }
        run.finalize()
    }

    /// Run the pipeline for every path concurrently.
    ///
    /// Each file gets its own blocking task. Summaries come back in input
    /// order, one per path; a file whose pipeline fails outright is reported
    /// with [`ErrorKind::ProcessingError`].
    pub async fn process_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<FileSummary> {
        let tasks = paths.iter().map(|path| {
            let processor = self.clone();
            let path = path.as_ref().to_path_buf();
            async move {
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || processor.process_file(&task_path))
                    .await
                    .map_err(PipelineError::from)
                    .and_then(|result| result);

                match outcome {
                    Ok(summary) => summary,
                    Err(err) => {
                        error!(path = %path.display(), error = %err, "File processing failed");
                        FileSummary::processing_error(&path)
                    }
                }
            }
        });

        let summaries = join_all(tasks).await;
        info!(files = summaries.len(), "Batch complete");
        summaries
    }

    /// Accept a previously sanitized file as-is.
    ///
    /// Reads `<base>_Output.csv` next to `path` and writes every row to
    /// `<base>_ErrorOmittedOutput.csv` without running any stage.
    pub fn reprocess_ignore_business(&self, path: &Path) -> PipelineResult<FileSummary> {
        let outputs = OutputPaths::for_input(path);
        let source = outputs.output();
        let (records, columns) = self.read_sanitized(&source)?;

        if !records.is_empty() {
            write_records(
                &outputs.error_omitted_output(),
                &records,
                output_columns(&columns),
                &self.config,
            )?;
        }

        info!(path = %source.display(), rows = records.len(), "Reprocessed without validation");
        Ok(FileSummary {
            valid_row_count: records.len(),
            ..FileSummary::for_path(&source, ErrorKind::NoError)
        })
    }

    /// Re-run business rules over a previously sanitized file.
    ///
    /// Reads `<base>_Output.csv` next to `path`. When rules flag any record,
    /// the flagged records go to `<base>Business_Error.csv` and the rest to
    /// `<base>_ErrorOmittedOutput.csv`.
    pub fn reprocess_ignore_format(&self, path: &Path) -> PipelineResult<FileSummary> {
        let outputs = OutputPaths::for_input(path);
        let source = outputs.output();
        let (mut records, columns) = self.read_sanitized(&source)?;

        let business_errors = self.registry.run_business_stage(&mut records);
        let mut valid_row_count = records.len();

        if !business_errors.is_empty() {
            write_records(
                &outputs.business_errors(),
                &business_errors,
                error_columns(&columns),
                &self.config,
            )?;

            let clean: Vec<&R> = records.iter().filter(|r| r.is_clean()).collect();
            if !clean.is_empty() {
                write_records(
                    &outputs.error_omitted_output(),
                    clean.iter().copied(),
                    output_columns(&columns),
                    &self.config,
                )?;
            }
            valid_row_count = clean.len();
        }

        let error_kind = ErrorKind::from_counts(0, 0, business_errors.len());
        info!(
            path = %source.display(),
            valid = valid_row_count,
            errors = business_errors.len(),
            "Reprocessed with business rules only"
        );
        Ok(FileSummary {
            valid_row_count,
            error_row_count: business_errors.len(),
            ..FileSummary::for_path(&source, error_kind)
        })
    }

    /// Read a file this pipeline wrote; such files always carry a header row.
    fn read_sanitized(&self, source: &Path) -> PipelineResult<(Vec<R>, Vec<String>)> {
        let config = CsvConfig {
            header: None,
            ..self.config.clone()
        };
        let mut stream = RecordStream::<R, _>::open(source, &config)?;
        let records = stream.read_all()?;
        if !stream.quarantine().is_empty() {
            warn!(
                path = %source.display(),
                dropped = stream.quarantine().len(),
                "Sanitized file contains rows that no longer bind"
            );
        }
        Ok((records, stream.csv_columns().to_vec()))
    }
}

// ================================================================================================
// Per-file run
// ================================================================================================

struct FileRun<'p, R: Record> {
    processor: &'p FileProcessor<R>,
    path: &'p Path,
    outputs: OutputPaths,
    columns: Vec<String>,
    records: Vec<R>,
    quarantine: Vec<QuarantineEntry>,
    file_errors: Vec<ValidationError>,
    format_errors: Vec<QuarantineEntry>,
    business_errors: Vec<R>,
}

impl<'p, R: Record + Clone> FileRun<'p, R> {
    fn new(processor: &'p FileProcessor<R>, path: &'p Path) -> Self {
        Self {
            processor,
            path,
            outputs: OutputPaths::for_input(path),
            columns: Vec::new(),
            records: Vec::new(),
            quarantine: Vec::new(),
            file_errors: Vec::new(),
            format_errors: Vec::new(),
            business_errors: Vec::new(),
        }
    }

    fn advance(&mut self, state: PipelineState) -> PipelineResult<PipelineState> {
        let processor = self.processor;
        let registry = &processor.registry;
        let config = &processor.config;

        let next = match state {
            PipelineState::Start => {
                self.file_errors = registry.run_file_stage(self.path, config)?;
                if self.file_errors.is_empty() {
                    PipelineState::FileChecked
                } else {
                    info!(
                        path = %self.path.display(),
                        errors = self.file_errors.len(),
                        "File checks failed; skipping remaining stages"
                    );
                    PipelineState::Finalized
                }
            }
            PipelineState::FileChecked => {
                let mut stream = RecordStream::<R, _>::open(self.path, config)?;
                self.records = stream.read_all()?;
                self.columns = stream.csv_columns().to_vec();
                self.quarantine = stream.take_quarantine();
                info!(
                    path = %self.path.display(),
                    records = self.records.len(),
                    quarantined = self.quarantine.len(),
                    "Parsed file"
                );
                PipelineState::Parsed
            }
            PipelineState::Parsed => {
                let quarantine = std::mem::take(&mut self.quarantine);
                self.format_errors = registry.run_format_stage(quarantine);
                if self.format_errors.is_empty() {
                    PipelineState::FormatChecked
                } else {
                    info!(
                        path = %self.path.display(),
                        errors = self.format_errors.len(),
                        "Format errors found; skipping business rules"
                    );
                    PipelineState::Finalized
                }
            }
            PipelineState::FormatChecked => {
                self.business_errors = registry.run_business_stage(&mut self.records);
                PipelineState::BusinessChecked
            }
            PipelineState::BusinessChecked | PipelineState::Finalized => PipelineState::Finalized,
        };
        Ok(next)
    }

    /// Write the result files and summarize the run.
    fn finalize(self) -> PipelineResult<FileSummary> {
        let config = &self.processor.config;

        let clean: Vec<&R> = self.records.iter().filter(|r| r.is_clean()).collect();
        let output_written = !clean.is_empty();
        if output_written {
            write_records(
                &self.outputs.output(),
                clean.iter().copied(),
                output_columns(&self.columns),
                config,
            )?;
        }

        if !self.file_errors.is_empty() {
            write_file_errors(&self.outputs.file_errors(), &self.file_errors, config)?;
        }
        if !self.format_errors.is_empty() {
            write_format_errors(
                &self.outputs.format_errors(),
                &self.format_errors,
                &self.columns,
                config,
            )?;
        }
        if !self.business_errors.is_empty() {
            write_records(
                &self.outputs.business_errors(),
                &self.business_errors,
                error_columns(&self.columns),
                config,
            )?;
        }

        let (file, format, business) = (
            self.file_errors.len(),
            self.format_errors.len(),
            self.business_errors.len(),
        );
        let error_kind = ErrorKind::from_counts(file, format, business);
        let summary = FileSummary {
            valid_row_count: clean.len(),
            error_row_count: file + format + business,
            reprocessable: output_written
                && matches!(error_kind, ErrorKind::Format | ErrorKind::BusinessValidation),
            ..FileSummary::for_path(self.path, error_kind)
        };

        info!(
            file = %summary.file_name,
            error_kind = %summary.error_kind,
            valid = summary.valid_row_count,
            errors = summary.error_row_count,
            "File processed"
        );
        Ok(summary)
    }
}
