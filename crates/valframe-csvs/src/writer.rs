/*!
# CSV Writer

Append-only, single-pass serializer. The header row is written as soon as a
writer is created; each `append` then emits exactly one record.
*/

use crate::{
    config::{normalize_column, CsvConfig},
    errors::{CsvError, CsvResult},
    quarantine::QuarantineEntry,
    schema::{Record, DESCRIPTION_COLUMN},
};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Text value of one column for one row.
pub type Getter<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

// ================================================================================================
// Row Layouts
// ================================================================================================

/// Ordered columns and the getter that produces each one.
pub struct RowLayout<T> {
    columns: Vec<String>,
    getters: Vec<Getter<T>>,
}

impl<T> RowLayout<T> {
    pub fn new(columns: Vec<String>, getters: Vec<Getter<T>>) -> CsvResult<Self> {
        if columns.len() != getters.len() {
            return Err(CsvError::InvalidFormat(format!(
                "{} columns but {} getters",
                columns.len(),
                getters.len()
            )));
        }
        Ok(Self { columns, getters })
    }

    /// Build a layout from `(column, getter)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Getter<T>)>,
        S: Into<String>,
    {
        let (columns, getters) = pairs
            .into_iter()
            .map(|(column, getter)| (column.into(), getter))
            .unzip();
        Self { columns, getters }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl<R: Record> RowLayout<R> {
    /// Layout for a record type; `columns` overrides schema inference.
    ///
    /// Columns that match no field are written empty.
    pub fn for_records(columns: Option<&[String]>) -> Self {
        let schema = R::schema();
        let columns = columns
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| schema.inferred_columns());

        let getters = columns
            .iter()
            .map(|column| -> Getter<R> {
                if normalize_column(column).eq_ignore_ascii_case(DESCRIPTION_COLUMN) {
                    return Box::new(|record: &R| record.description().to_string());
                }
                match schema.field(column) {
                    Some(field) => Box::new(move |record: &R| field.render(record)),
                    None => Box::new(|_: &R| String::new()),
                }
            })
            .collect();

        Self { columns, getters }
    }
}

impl RowLayout<QuarantineEntry> {
    pub fn for_quarantine(columns: &[String]) -> Self {
        let getters = columns
            .iter()
            .map(|column| -> Getter<QuarantineEntry> {
                let column = column.clone();
                Box::new(move |entry: &QuarantineEntry| entry.render(&column))
            })
            .collect();

        Self {
            columns: columns.to_vec(),
            getters,
        }
    }
}

// ================================================================================================
// Writer
// ================================================================================================

pub struct CsvWriter<T, W: Write> {
    inner: W,
    layout: RowLayout<T>,
    separator: char,
    qualifier: char,
    end_of_line: String,
    rows_written: usize,
}

impl<T, W: Write> CsvWriter<T, W> {
    /// Wrap `inner` and write the header row immediately.
    pub fn from_writer(inner: W, layout: RowLayout<T>, config: &CsvConfig) -> CsvResult<Self> {
        let mut writer = Self {
            inner,
            layout,
            separator: config.field_separator,
            qualifier: config.text_qualifier,
            end_of_line: config.end_of_line.clone(),
            rows_written: 0,
        };
        let header = writer.join(writer.layout.columns.iter().map(|c| Cow::Borrowed(c.as_str())));
        writer.write_line(&header)?;
        Ok(writer)
    }

    pub fn append(&mut self, row: &T) -> CsvResult<()> {
        let line = self.join(self.layout.getters.iter().map(|get| Cow::Owned(get(row))));
        self.write_line(&line)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> CsvResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn join<'a, I>(&self, values: I) -> String
    where
        I: Iterator<Item = Cow<'a, str>>,
    {
        let mut line = String::new();
        for (i, value) in values.enumerate() {
            if i > 0 {
                line.push(self.separator);
            }
            line.push_str(&quote_field(&value, self.separator, self.qualifier));
        }
        line
    }

    fn write_line(&mut self, line: &str) -> CsvResult<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(self.end_of_line.as_bytes())?;
        Ok(())
    }
}

impl<T> CsvWriter<T, BufWriter<File>> {
    /// Create (or truncate) a file destination; see [`csv_destination`].
    pub fn create(path: &Path, layout: RowLayout<T>, config: &CsvConfig) -> CsvResult<Self> {
        let path = csv_destination(path)?;
        let file = File::create(&path)?;
        Self::from_writer(BufWriter::new(file), layout, config)
    }
}

/// Quote `value` when it contains the separator, the qualifier or a line
/// break, or starts with a space or tab (readers skip leading blanks of an
/// unquoted field). Every embedded qualifier is doubled.
pub fn quote_field(value: &str, separator: char, qualifier: char) -> Cow<'_, str> {
    let needs_quotes = value.starts_with([' ', '\t'])
        || value
            .chars()
            .any(|c| c == separator || c == qualifier || c == '\r' || c == '\n');
    if !needs_quotes {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(qualifier);
    for c in value.chars() {
        if c == qualifier {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push(qualifier);
    Cow::Owned(quoted)
}

/// Resolve a destination path: a `.csv` extension is appended when missing
/// and the parent directory is created.
pub fn csv_destination(path: &Path) -> CsvResult<PathBuf> {
    let mut path = path.to_path_buf();
    if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
        let mut name = path.as_os_str().to_os_string();
        name.push(".csv");
        path = PathBuf::from(name);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(path)
}

/// Write every row of `rows` to `path`, returning the number of rows written.
pub fn write_csv<'a, T, I>(
    path: &Path,
    rows: I,
    layout: RowLayout<T>,
    config: &CsvConfig,
) -> CsvResult<usize>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = CsvWriter::create(path, layout, config)?;
    for row in rows {
        writer.append(row)?;
    }
    let count = writer.rows_written();
    writer.into_inner()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarantine::QuarantinedValue;
    use crate::schema::{RecordMeta, Schema};
    use std::sync::OnceLock;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct Lane {
        origin: String,
        stops: i32,
        meta: RecordMeta,
    }

    impl Record for Lane {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Lane>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .text("Origin", |l: &Lane| l.origin.as_str(), |l, v| l.origin = v)
                    .int32("Stops", |l: &Lane| l.stops, |l, v| l.stops = v)
                    .build()
            })
        }

        fn meta(&self) -> &RecordMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    }

    fn lane(origin: &str, stops: i32) -> Lane {
        Lane {
            origin: origin.to_string(),
            stops,
            ..Default::default()
        }
    }

    fn written<T>(layout: RowLayout<T>, rows: &[T], config: &CsvConfig) -> String {
        let mut writer = CsvWriter::from_writer(Vec::new(), layout, config).unwrap();
        for row in rows {
            writer.append(row).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("plain", ',', '"'), "plain");
        assert_eq!(quote_field("A,B", ',', '"'), "\"A,B\"");
        assert_eq!(quote_field("say \"hi\"", ',', '"'), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\nlines", ',', '"'), "\"two\nlines\"");
        assert_eq!(quote_field("A,B", ';', '"'), "A,B");
    }

    #[test]
    fn test_quote_field_keeps_leading_blanks() {
        assert_eq!(quote_field(" A", ',', '"'), "\" A\"");
        assert_eq!(quote_field("\tB", ',', '"'), "\"\tB\"");
        assert_eq!(quote_field("A ", ',', '"'), "A ");
    }

    #[test]
    fn test_inferred_columns_with_description() {
        let mut flagged = lane("Origin", 2);
        flagged.append_description("Bad lane;");
        let out = written(
            RowLayout::for_records(None),
            &[lane("Home", 1), flagged],
            &CsvConfig::default(),
        );
        assert_eq!(
            out,
            "Origin,Stops,Description\r\nHome,1,\r\nOrigin,2,Bad lane;\r\n"
        );
    }

    #[test]
    fn test_explicit_columns_override_inference() {
        let columns = vec!["Stops".to_string(), "origin".to_string(), "Unknown".to_string()];
        let config = CsvConfig::default().with_columns(columns.clone());
        let out = written(
            RowLayout::for_records(config.columns.as_deref()),
            &[lane("Home", 3)],
            &config,
        );
        assert_eq!(out, "Stops,origin,Unknown\r\n3,Home,\r\n");
    }

    #[test]
    fn test_header_written_even_without_rows() {
        let config = CsvConfig {
            end_of_line: "\n".to_string(),
            ..Default::default()
        };
        let out = written::<Lane>(RowLayout::for_records(None), &[], &config);
        assert_eq!(out, "Origin,Stops,Description\n");
    }

    #[test]
    fn test_quarantine_layout() {
        let entry = QuarantineEntry {
            values: vec![QuarantinedValue {
                name: "Stops".to_string(),
                header: "Stops".to_string(),
                value: Some("a,b".to_string()),
                field_type: None,
            }],
            description: "Stops-Int32 Data type".to_string(),
            raw_text: String::new(),
        };
        let columns = vec!["Stops".to_string(), "Description".to_string()];
        let out = written(
            RowLayout::for_quarantine(&columns),
            &[entry],
            &CsvConfig::default(),
        );
        assert_eq!(out, "Stops,Description\r\n\"a,b\",Stops-Int32 Data type\r\n");
    }

    #[test]
    fn test_layout_length_mismatch() {
        let result = RowLayout::<Lane>::new(vec!["a".to_string()], Vec::new());
        assert!(matches!(result, Err(CsvError::InvalidFormat(_))));
    }

    #[test]
    fn test_csv_destination_appends_extension_and_creates_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("report");
        let resolved = csv_destination(&target).unwrap();
        assert_eq!(resolved, dir.path().join("nested").join("report.csv"));
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_write_csv_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lanes.csv");
        let rows = vec![lane("Home", 1), lane("Away", 2)];
        let count = write_csv(
            &path,
            &rows,
            RowLayout::for_records(None),
            &CsvConfig::default(),
        )
        .unwrap();
        assert_eq!(count, 2);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Origin,Stops,Description\r\n"));
        assert_eq!(text.lines().count(), 3);
    }
}
