use thiserror::Error;

pub type CsvResult<T> = Result<T, CsvError>;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{column}' is bound to a field of unsupported type '{type_name}'")]
    UnsupportedFieldType { column: String, type_name: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// A single text value that could not be converted into its field type.
///
/// Raised by the schema binder; the record stream turns it into a
/// quarantine entry instead of propagating it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {value:?} to {type_name}")]
pub struct ConversionError {
    pub value: Option<String>,
    pub type_name: &'static str,
}
