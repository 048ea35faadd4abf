use crate::config::normalize_column;
use crate::schema::{FieldType, DESCRIPTION_COLUMN};

/// One column of a row that failed binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedValue {
    /// Column name with whitespace stripped
    pub name: String,

    /// Column name as it appeared in the header
    pub header: String,

    /// Raw text; `None` when the row ended before this column
    pub value: Option<String>,

    /// Type of the field the column is bound to, if any
    pub field_type: Option<FieldType>,
}

impl QuarantinedValue {
    /// Absent or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty())
    }
}

/// A row whose text could not be bound into a typed record.
///
/// Every header column is present, in header order, holding the raw text the
/// tokenizer produced for that row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarantineEntry {
    pub values: Vec<QuarantinedValue>,
    pub description: String,
    pub raw_text: String,
}

impl QuarantineEntry {
    /// Look a column up by name, ignoring case and whitespace.
    pub fn get(&self, column: &str) -> Option<&QuarantinedValue> {
        let normalized = normalize_column(column);
        self.values
            .iter()
            .find(|value| value.name.eq_ignore_ascii_case(&normalized))
    }

    /// Text the writer emits for `column`.
    pub fn render(&self, column: &str) -> String {
        if normalize_column(column).eq_ignore_ascii_case(DESCRIPTION_COLUMN) {
            return self.description.clone();
        }
        self.get(column)
            .and_then(|value| value.value.clone())
            .unwrap_or_default()
    }
}
