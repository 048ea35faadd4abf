use serde::{Deserialize, Serialize};

/// Parse and write settings shared by readers and writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Header line to use instead of the first line of the source
    pub header: Option<String>,

    /// Field separator (e.g. `,` or `;`)
    pub field_separator: char,

    /// Character used to quote fields
    pub text_qualifier: char,

    /// Line terminator emitted by writers
    pub end_of_line: String,

    /// Explicit column list for writers; overrides schema inference
    pub columns: Option<Vec<String>>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            header: None,
            field_separator: ',',
            text_qualifier: '"',
            end_of_line: "\r\n".to_string(),
            columns: None,
        }
    }
}

impl CsvConfig {
    /// Copy of this configuration that writes exactly `columns`.
    pub fn with_columns<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            ..self.clone()
        }
    }

    /// Copy of this configuration that reads `header` instead of the first line.
    pub fn with_header(&self, header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            ..self.clone()
        }
    }
}

/// Strip every whitespace character from a column name.
///
/// Normalized names are what binding lookups compare against; the raw
/// header is kept for display and output headers.
pub fn normalize_column(column: &str) -> String {
    column.chars().filter(|c| !c.is_whitespace()).collect()
}
