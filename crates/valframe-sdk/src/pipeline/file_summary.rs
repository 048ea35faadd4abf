use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// First stage that reported an error for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "No Error")]
    NoError,
    File,
    Format,
    #[serde(rename = "Business Validation")]
    BusinessValidation,
    /// The file's pipeline hard-failed (configuration or I/O fault)
    #[serde(rename = "Processing Error")]
    ProcessingError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoError => "No Error",
            ErrorKind::File => "File",
            ErrorKind::Format => "Format",
            ErrorKind::BusinessValidation => "Business Validation",
            ErrorKind::ProcessingError => "Processing Error",
        }
    }

    /// First non-empty stage in File, Format, Business order.
    pub fn from_counts(file: usize, format: usize, business: usize) -> Self {
        if file > 0 {
            ErrorKind::File
        } else if format > 0 {
            ErrorKind::Format
        } else if business > 0 {
            ErrorKind::BusinessValidation
        } else {
            ErrorKind::NoError
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of one pipeline run over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub file_path: PathBuf,
    pub error_kind: ErrorKind,
    pub valid_row_count: usize,
    pub error_row_count: usize,
    pub reprocessable: bool,
}

impl FileSummary {
    pub(crate) fn for_path(path: &Path, error_kind: ErrorKind) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
            error_kind,
            valid_row_count: 0,
            error_row_count: 0,
            reprocessable: false,
        }
    }

    /// Summary reported for a file whose pipeline failed outright.
    pub fn processing_error(path: &Path) -> Self {
        Self::for_path(path, ErrorKind::ProcessingError)
    }

    pub fn has_errors(&self) -> bool {
        self.error_kind != ErrorKind::NoError
    }
}
