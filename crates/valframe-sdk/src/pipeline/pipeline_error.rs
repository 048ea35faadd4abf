#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Csv(#[from] valframe_csvs::CsvError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("No CSV files found next to: {0}")]
    NoCsvFiles(String),

    #[error("File task did not complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
