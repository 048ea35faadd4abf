/*!
# Record Schemas

A [`Schema`] is the ordered list of fields a record type exposes to the
codec. Each field carries its column name, its declared [`FieldType`] and a
typed getter/setter pair, so binding a column to a field never needs runtime
type inspection.

Schemas are built once per record type (usually inside a `OnceLock`) and
handed out as `&'static Schema<Self>` from [`Record::schema`].
*/

use crate::errors::ConversionError;
use crate::config::normalize_column;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Column carrying the validation annotation of a record or quarantined row.
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Format used when writing date/time values.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATE_TIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

// ================================================================================================
// Field Types & Converters
// ================================================================================================

/// Semantic type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Non-empty, alphabetic-only text
    Text,
    Int32,
    Int64,
    DateTime,
    /// A member the binder has no converter for
    Unsupported(&'static str),
}

impl FieldType {
    /// Display name used in format-stage error descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "String",
            FieldType::Int32 => "Int32",
            FieldType::Int64 => "Int64",
            FieldType::DateTime => "DateTime",
            FieldType::Unsupported(type_name) => type_name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Unsupported(_))
    }

    /// Run the same conversion the binder would run, discarding the value.
    ///
    /// Unsupported types have no converter and always pass.
    pub fn check(&self, raw: Option<&str>) -> Result<(), ConversionError> {
        match self {
            FieldType::Text => parse_text(raw).map(|_| ()),
            FieldType::Int32 => parse_i32(raw).map(|_| ()),
            FieldType::Int64 => parse_i64(raw).map(|_| ()),
            FieldType::DateTime => parse_date_time(raw).map(|_| ()),
            FieldType::Unsupported(_) => Ok(()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn conversion_error(raw: Option<&str>, field_type: FieldType) -> ConversionError {
    ConversionError {
        value: raw.map(str::to_string),
        type_name: field_type.name(),
    }
}

/// Accept only non-empty ASCII alphabetic text.
pub fn parse_text(raw: Option<&str>) -> Result<String, ConversionError> {
    match raw {
        Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(s.to_string())
        }
        _ => Err(conversion_error(raw, FieldType::Text)),
    }
}

pub fn parse_i32(raw: Option<&str>) -> Result<i32, ConversionError> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
        .ok_or_else(|| conversion_error(raw, FieldType::Int32))
}

pub fn parse_i64(raw: Option<&str>) -> Result<i64, ConversionError> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| conversion_error(raw, FieldType::Int64))
}

/// Parse ISO, RFC 3339, US-style and date-only timestamps.
pub fn parse_date_time(raw: Option<&str>) -> Result<NaiveDateTime, ConversionError> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(conversion_error(raw, FieldType::DateTime));
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_INPUT_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| conversion_error(raw, FieldType::DateTime))
}

pub fn render_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

// ================================================================================================
// Fields
// ================================================================================================

enum Accessor<R> {
    Text {
        get: fn(&R) -> &str,
        set: fn(&mut R, String),
    },
    Int32 {
        get: fn(&R) -> i32,
        set: fn(&mut R, i32),
    },
    Int64 {
        get: fn(&R) -> i64,
        set: fn(&mut R, i64),
    },
    DateTime {
        get: fn(&R) -> NaiveDateTime,
        set: fn(&mut R, NaiveDateTime),
    },
    Opaque {
        type_name: &'static str,
        get: fn(&R) -> String,
    },
}

/// One externally settable member of a record type.
pub struct Field<R> {
    name: &'static str,
    ignored: bool,
    accessor: Accessor<R>,
}

impl<R> Field<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        match &self.accessor {
            Accessor::Text { .. } => FieldType::Text,
            Accessor::Int32 { .. } => FieldType::Int32,
            Accessor::Int64 { .. } => FieldType::Int64,
            Accessor::DateTime { .. } => FieldType::DateTime,
            Accessor::Opaque { type_name, .. } => FieldType::Unsupported(type_name),
        }
    }

    /// Excluded from inferred writer columns.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Case- and whitespace-insensitive column match.
    pub fn matches(&self, column: &str) -> bool {
        normalize_column(column).eq_ignore_ascii_case(self.name)
    }

    /// Convert `raw` and store it into `record`.
    pub fn bind(&self, record: &mut R, raw: Option<&str>) -> Result<(), ConversionError> {
        match &self.accessor {
            Accessor::Text { set, .. } => set(record, parse_text(raw)?),
            Accessor::Int32 { set, .. } => set(record, parse_i32(raw)?),
            Accessor::Int64 { set, .. } => set(record, parse_i64(raw)?),
            Accessor::DateTime { set, .. } => set(record, parse_date_time(raw)?),
            Accessor::Opaque { .. } => return Err(conversion_error(raw, self.field_type())),
        }
        Ok(())
    }

    /// Text form of the field as the writer emits it.
    pub fn render(&self, record: &R) -> String {
        match &self.accessor {
            Accessor::Text { get, .. } => get(record).to_string(),
            Accessor::Int32 { get, .. } => get(record).to_string(),
            Accessor::Int64 { get, .. } => get(record).to_string(),
            Accessor::DateTime { get, .. } => render_date_time(&get(record)),
            Accessor::Opaque { get, .. } => get(record),
        }
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.field_type())
            .field("ignored", &self.ignored)
            .finish()
    }
}

// ================================================================================================
// Schema
// ================================================================================================

/// Ordered field descriptors for a record type, in declaration order.
#[derive(Debug)]
pub struct Schema<R> {
    fields: Vec<Field<R>>,
}

impl<R> Schema<R> {
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    /// Resolve a column name to its field.
    pub fn field(&self, column: &str) -> Option<&Field<R>> {
        let normalized = normalize_column(column);
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(&normalized))
    }

    /// Names of every member, including ignored ones.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    /// Writer columns when none are configured: every non-ignored member
    /// followed by the description column.
    pub fn inferred_columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| !field.ignored)
            .map(|field| field.name.to_string())
            .chain(std::iter::once(DESCRIPTION_COLUMN.to_string()))
            .collect()
    }
}

pub struct SchemaBuilder<R> {
    fields: Vec<Field<R>>,
}

impl<R> SchemaBuilder<R> {
    fn push(mut self, name: &'static str, accessor: Accessor<R>) -> Self {
        self.fields.push(Field {
            name,
            ignored: false,
            accessor,
        });
        self
    }

    pub fn text(self, name: &'static str, get: fn(&R) -> &str, set: fn(&mut R, String)) -> Self {
        self.push(name, Accessor::Text { get, set })
    }

    pub fn int32(self, name: &'static str, get: fn(&R) -> i32, set: fn(&mut R, i32)) -> Self {
        self.push(name, Accessor::Int32 { get, set })
    }

    pub fn int64(self, name: &'static str, get: fn(&R) -> i64, set: fn(&mut R, i64)) -> Self {
        self.push(name, Accessor::Int64 { get, set })
    }

    pub fn date_time(
        self,
        name: &'static str,
        get: fn(&R) -> NaiveDateTime,
        set: fn(&mut R, NaiveDateTime),
    ) -> Self {
        self.push(name, Accessor::DateTime { get, set })
    }

    /// A member with no text converter. It can be written but binding a
    /// source column to it is a configuration error.
    pub fn opaque(self, name: &'static str, type_name: &'static str, get: fn(&R) -> String) -> Self {
        self.push(name, Accessor::Opaque { type_name, get })
    }

    /// Mark the most recently added field as ignored for serialization.
    pub fn ignored(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.ignored = true;
        }
        self
    }

    pub fn build(self) -> Schema<R> {
        Schema {
            fields: self.fields,
        }
    }
}

// ================================================================================================
// Records
// ================================================================================================

/// Annotation and provenance carried by every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMeta {
    /// Validation failure notes; non-empty means the row is invalid
    pub description: String,

    /// Source text the record was parsed from
    pub raw_text: String,
}

/// A strongly-typed row.
pub trait Record: Default + Send + Sync + 'static {
    fn schema() -> &'static Schema<Self>;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn description(&self) -> &str {
        &self.meta().description
    }

    fn raw_text(&self) -> &str {
        &self.meta().raw_text
    }

    fn is_clean(&self) -> bool {
        self.meta().description.is_empty()
    }

    /// Add a note to the description; existing notes are kept.
    fn append_description(&mut self, note: &str) {
        self.meta_mut().description.push_str(note);
    }
}
