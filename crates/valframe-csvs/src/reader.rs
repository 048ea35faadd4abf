/*!
# Record Stream

Lazy, forward-only iterator of typed records. Rows whose fields cannot all be
converted are diverted into a quarantine list instead of being yielded; the
list grows as the stream is consumed and is only complete once the stream is
exhausted.
*/

use crate::{
    config::{normalize_column, CsvConfig},
    errors::{CsvError, CsvResult},
    quarantine::{QuarantineEntry, QuarantinedValue},
    schema::{Field, Record},
    tokenizer::Tokenizer,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

struct RawRow {
    values: Vec<Option<String>>,
    text: String,
}

pub struct RecordStream<R: Record, S> {
    tokenizer: Tokenizer<S>,
    csv_columns: Vec<String>,
    normalized_columns: Vec<String>,
    bindings: Vec<Option<&'static Field<R>>>,
    quarantine: Vec<QuarantineEntry>,
    pending: Option<RawRow>,
    finished: bool,
}

impl<R: Record> RecordStream<R, BufReader<File>> {
    /// Open a file and read its header.
    pub fn open(path: &Path, config: &CsvConfig) -> CsvResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Record, S: BufRead> RecordStream<R, S> {
    /// Read the header (or take it from `config.header`) and bind every
    /// column to its record field.
    ///
    /// Fails when a column is bound to a field the binder cannot convert.
    pub fn from_reader(source: S, config: &CsvConfig) -> CsvResult<Self> {
        let mut tokenizer = Tokenizer::new(source, config.field_separator, config.text_qualifier);

        let csv_columns = match &config.header {
            Some(header) => {
                tokenizer.load_line(header);
                tokenizer.read_all_fields()?
            }
            None if tokenizer.next_row()? => tokenizer.read_all_fields()?,
            None => Vec::new(),
        };
        let normalized_columns: Vec<String> =
            csv_columns.iter().map(|c| normalize_column(c)).collect();

        let schema = R::schema();
        let mut bindings = Vec::with_capacity(csv_columns.len());
        for column in &csv_columns {
            let field = schema.field(column);
            if let Some(field) = field {
                if !field.field_type().is_supported() {
                    return Err(CsvError::UnsupportedFieldType {
                        column: column.clone(),
                        type_name: field.field_type().name().to_string(),
                    });
                }
            }
            bindings.push(field);
        }

        debug!(columns = ?csv_columns, "Read CSV header");

        Ok(Self {
            tokenizer,
            csv_columns,
            normalized_columns,
            bindings,
            quarantine: Vec::new(),
            pending: None,
            finished: false,
        })
    }

    /// Columns as read from the header.
    pub fn csv_columns(&self) -> &[String] {
        &self.csv_columns
    }

    /// Header columns with whitespace stripped.
    pub fn normalized_columns(&self) -> &[String] {
        &self.normalized_columns
    }

    /// Rows quarantined so far.
    pub fn quarantine(&self) -> &[QuarantineEntry] {
        &self.quarantine
    }

    pub fn take_quarantine(&mut self) -> Vec<QuarantineEntry> {
        std::mem::take(&mut self.quarantine)
    }

    /// Whether at least one data row follows the current position.
    ///
    /// The row is buffered, not consumed: iteration still yields it.
    pub fn has_records(&mut self) -> CsvResult<bool> {
        if self.pending.is_none() {
            self.pending = self.read_row()?;
        }
        Ok(self.pending.is_some())
    }

    /// Drain the stream into a vector of records.
    pub fn read_all(&mut self) -> CsvResult<Vec<R>> {
        self.by_ref().collect()
    }

    fn read_row(&mut self) -> CsvResult<Option<RawRow>> {
        if self.finished {
            return Ok(None);
        }
        loop {
            if !self.tokenizer.next_row()? {
                self.finished = true;
                return Ok(None);
            }
            if self.tokenizer.is_blank_row() {
                continue;
            }
            let values = self.tokenizer.read_fields(self.csv_columns.len())?;
            return Ok(Some(RawRow {
                values,
                text: self.tokenizer.row_text().to_string(),
            }));
        }
    }

    fn next_record(&mut self) -> CsvResult<Option<R>> {
        loop {
            let row = match self.pending.take() {
                Some(row) => row,
                None => match self.read_row()? {
                    Some(row) => row,
                    None => return Ok(None),
                },
            };

            match self.bind(&row) {
                Some(record) => return Ok(Some(record)),
                None => {
                    debug!(row = %row.text, "Quarantined row");
                    let entry = self.quarantine_entry(row);
                    self.quarantine.push(entry);
                }
            }
        }
    }

    fn bind(&self, row: &RawRow) -> Option<R> {
        let mut record = R::default();
        for (field, value) in self.bindings.iter().zip(&row.values) {
            if let Some(field) = field {
                field.bind(&mut record, value.as_deref()).ok()?;
            }
        }
        record.meta_mut().raw_text = row.text.clone();
        Some(record)
    }

    fn quarantine_entry(&self, row: RawRow) -> QuarantineEntry {
        let values = row
            .values
            .into_iter()
            .enumerate()
            .map(|(i, value)| QuarantinedValue {
                name: self.normalized_columns[i].clone(),
                header: self.csv_columns[i].clone(),
                value,
                field_type: self.bindings[i].map(|field| field.field_type()),
            })
            .collect();

        QuarantineEntry {
            values,
            description: String::new(),
            raw_text: row.text,
        }
    }
}

impl<R: Record, S: BufRead> Iterator for RecordStream<R, S> {
    type Item = CsvResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(err) => {
                self.finished = true;
                self.pending = None;
                Some(Err(err))
            }
        }
    }
}

/// Read every record of a file, returning the records, the quarantine and
/// the header columns.
pub fn read_csv<R: Record>(
    path: &Path,
    config: &CsvConfig,
) -> CsvResult<(Vec<R>, Vec<QuarantineEntry>, Vec<String>)> {
    let mut stream = RecordStream::<R, _>::open(path, config)?;
    let records = stream.read_all()?;
    let columns = stream.csv_columns().to_vec();
    Ok((records, stream.take_quarantine(), columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RecordMeta, Schema};
    use crate::writer::{CsvWriter, RowLayout};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Cursor;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Leg {
        origin: String,
        destination: String,
        pickup_date: NaiveDateTime,
        weight: i32,
        meta: RecordMeta,
    }

    impl Record for Leg {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Leg>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .text("Origin", |l: &Leg| l.origin.as_str(), |l, v| l.origin = v)
                    .text("Destination", |l: &Leg| l.destination.as_str(), |l, v| {
                        l.destination = v
                    })
                    .date_time("PickupDate", |l: &Leg| l.pickup_date, |l, v| l.pickup_date = v)
                    .int32("Weight", |l: &Leg| l.weight, |l, v| l.weight = v)
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

    #[derive(Debug, Default)]
    struct Invoice {
        meta: RecordMeta,
    }

    impl Record for Invoice {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Invoice>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::builder()
                    .opaque("Amount", "Decimal", |_| String::new())
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

    fn stream(text: &str) -> RecordStream<Leg, Cursor<Vec<u8>>> {
        RecordStream::from_reader(Cursor::new(text.as_bytes().to_vec()), &CsvConfig::default())
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_reads_header_and_records() {
        let mut stream = stream(
            "Origin,Destination,Pickup Date,Weight\r\n\
             ABL,CGO,2024-01-02 08:15:00,10\r\n\
             CCI,CLV,2024-01-03 08:15:00,20\r\n",
        );
        assert_eq!(stream.csv_columns(), ["Origin", "Destination", "Pickup Date", "Weight"]);
        assert_eq!(stream.normalized_columns()[2], "PickupDate");

        let records = stream.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].origin, "ABL");
        assert_eq!(records[0].pickup_date, date(2024, 1, 2));
        assert_eq!(records[1].weight, 20);
        assert_eq!(records[1].raw_text(), "CCI,CLV,2024-01-03 08:15:00,20");
        assert!(stream.quarantine().is_empty());
    }

    #[test]
    fn test_unbindable_row_is_quarantined_once() {
        let mut stream = stream(
            "Origin,Destination,PickupDate,Weight\n\
             ABL,CGO,not-a-date,10\n\
             CCI,CLV,2024-01-03 08:15:00,20\n",
        );
        let records = stream.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, "CCI");

        let quarantine = stream.quarantine();
        assert_eq!(quarantine.len(), 1);
        let entry = &quarantine[0];
        assert_eq!(entry.values.len(), 4);
        assert_eq!(entry.get("Origin").unwrap().value.as_deref(), Some("ABL"));
        assert_eq!(entry.get("PickupDate").unwrap().value.as_deref(), Some("not-a-date"));
        assert_eq!(entry.get("Weight").unwrap().value.as_deref(), Some("10"));
        assert_eq!(entry.raw_text, "ABL,CGO,not-a-date,10");
    }

    #[test]
    fn test_short_row_is_quarantined_with_null_values() {
        let mut stream = stream("Origin,Destination,PickupDate,Weight\nABL,CGO\n");
        assert!(stream.read_all().unwrap().is_empty());
        let entry = &stream.quarantine()[0];
        assert!(entry.get("PickupDate").unwrap().value.is_none());
        assert!(entry.get("Weight").unwrap().value.is_none());
    }

    #[test]
    fn test_has_records_does_not_consume() {
        let mut stream = stream("Origin,Destination,PickupDate,Weight\nABL,CGO,2024-01-02,1\n");
        assert!(stream.has_records().unwrap());
        assert!(stream.has_records().unwrap());
        assert_eq!(stream.read_all().unwrap().len(), 1);
        assert!(!stream.has_records().unwrap());
    }

    #[test]
    fn test_header_only_and_empty_sources() {
        let mut header_only = stream("Origin,Destination\r\n");
        assert!(!header_only.has_records().unwrap());

        let mut empty = stream("");
        assert!(empty.csv_columns().is_empty());
        assert!(!empty.has_records().unwrap());
    }

    #[test]
    fn test_exhausted_stream_stays_exhausted() {
        let mut stream = stream("Origin,Destination,PickupDate,Weight\nABL,CGO,2024-01-02,1\n");
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut stream = stream("Origin,Destination,PickupDate,Weight\n\nABL,CGO,2024-01-02,1\n   \n");
        assert_eq!(stream.read_all().unwrap().len(), 1);
        assert!(stream.quarantine().is_empty());
    }

    #[test]
    fn test_header_override() {
        let config = CsvConfig::default().with_header("Origin;Weight");
        let config = CsvConfig {
            field_separator: ';',
            ..config
        };
        let mut stream =
            RecordStream::<Leg, _>::from_reader(Cursor::new(b"ABL;5\n".to_vec()), &config).unwrap();
        let records = stream.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, "ABL");
        assert_eq!(records[0].weight, 5);
    }

    #[test]
    fn test_unsupported_field_type_is_fatal() {
        let result =
            RecordStream::<Invoice, _>::from_reader(Cursor::new(b"Amount\n1.5\n".to_vec()), &CsvConfig::default());
        match result {
            Err(CsvError::UnsupportedFieldType { column, type_name }) => {
                assert_eq!(column, "Amount");
                assert_eq!(type_name, "Decimal");
            }
            other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_written_records_read_back_equal() {
        let legs: Vec<Leg> = (0..10)
            .map(|i| Leg {
                origin: ["Home", "Depot", "Hub"][i % 3].to_string(),
                destination: "Destination".to_string(),
                pickup_date: date(2024, 2, 1 + i as u32),
                weight: i as i32 * 100,
                meta: RecordMeta::default(),
            })
            .collect();

        let mut writer =
            CsvWriter::from_writer(Vec::new(), RowLayout::for_records(None), &CsvConfig::default())
                .unwrap();
        for leg in &legs {
            writer.append(leg).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let mut stream =
            RecordStream::<Leg, _>::from_reader(Cursor::new(bytes), &CsvConfig::default()).unwrap();
        let read: Vec<Leg> = stream.read_all().unwrap();
        assert_eq!(read.len(), legs.len());
        for (original, parsed) in legs.iter().zip(&read) {
            assert_eq!(original.origin, parsed.origin);
            assert_eq!(original.destination, parsed.destination);
            assert_eq!(original.pickup_date, parsed.pickup_date);
            assert_eq!(original.weight, parsed.weight);
        }
    }
}
