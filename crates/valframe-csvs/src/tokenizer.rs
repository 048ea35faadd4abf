/*!
# Field Tokenizer

Character-level scanner over a line-oriented source. A row normally spans one
physical line; a quoted field that runs past the end of a line pulls the next
physical line in as a continuation, with the line break kept in the value.
*/

use crate::errors::CsvResult;
use std::io::BufRead;

pub struct Tokenizer<S> {
    source: S,
    separator: char,
    qualifier: char,
    line: Vec<char>,
    pos: usize,
    loaded: bool,
    row_text: String,
    buf: String,
    terminator: &'static str,
    at_start: bool,
}

impl<S: BufRead> Tokenizer<S> {
    pub fn new(source: S, separator: char, qualifier: char) -> Self {
        Self {
            source,
            separator,
            qualifier,
            line: Vec::new(),
            pos: 0,
            loaded: false,
            row_text: String::new(),
            buf: String::new(),
            terminator: "",
            at_start: true,
        }
    }

    /// Position the tokenizer at the start of the next physical line.
    ///
    /// Returns `false` once the source is exhausted; every later call keeps
    /// returning `false`.
    pub fn next_row(&mut self) -> CsvResult<bool> {
        match self.read_physical_line()? {
            Some(text) => {
                self.load_line(&text);
                Ok(true)
            }
            None => {
                self.loaded = false;
                self.line.clear();
                self.pos = 0;
                self.row_text.clear();
                Ok(false)
            }
        }
    }

    /// Tokenize `text` as if it were the current row (used for header overrides).
    pub fn load_line(&mut self, text: &str) {
        self.line = text.chars().collect();
        self.pos = 0;
        self.loaded = true;
        self.row_text = text.to_string();
    }

    /// Whole source text of the current row, continuation lines included.
    pub fn row_text(&self) -> &str {
        &self.row_text
    }

    pub fn is_blank_row(&self) -> bool {
        self.line.iter().all(|c| c.is_whitespace())
    }

    pub fn at_separator(&self) -> bool {
        self.current() == Some(self.separator)
    }

    /// Step over a separator. Returns `false` (and stays put) on anything else.
    pub fn skip_separator(&mut self) -> bool {
        if self.at_separator() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read the field starting at the current position.
    ///
    /// `None` means the row has no more fields.
    pub fn next_field(&mut self) -> CsvResult<Option<String>> {
        if !self.loaded || self.pos >= self.line.len() {
            return Ok(None);
        }

        while let Some(c) = self.current() {
            if (c == ' ' || c == '\t') && c != self.separator {
                self.pos += 1;
            } else {
                break;
            }
        }

        let mut field = String::new();

        if self.current() == Some(self.qualifier) {
            self.pos += 1;
            loop {
                match self.current() {
                    Some(c) if c == self.qualifier => {
                        self.pos += 1;
                        if self.current() == Some(self.qualifier) {
                            field.push(self.qualifier);
                            self.pos += 1;
                        } else {
                            return Ok(Some(field));
                        }
                    }
                    Some(c) => {
                        field.push(c);
                        self.pos += 1;
                    }
                    None => {
                        let terminator = self.terminator;
                        match self.read_physical_line()? {
                            Some(next) => {
                                field.push_str(terminator);
                                self.row_text.push_str(terminator);
                                self.row_text.push_str(&next);
                                self.line = next.chars().collect();
                                self.pos = 0;
                            }
                            // Unterminated quote at end of input
                            None => return Ok(Some(field)),
                        }
                    }
                }
            }
        }

        while let Some(c) = self.current() {
            if c == self.separator || c == '\r' || c == '\n' {
                break;
            }
            field.push(c);
            self.pos += 1;
        }
        Ok(Some(field))
    }

    /// Read up to `count` fields of the current row.
    ///
    /// Reading stops early when a field is not followed by a separator; the
    /// remaining slots stay `None`.
    pub fn read_fields(&mut self, count: usize) -> CsvResult<Vec<Option<String>>> {
        let mut fields = vec![None; count];
        for slot in fields.iter_mut() {
            *slot = self.next_field()?;
            if !self.skip_separator() {
                break;
            }
        }
        Ok(fields)
    }

    /// Read every field of the current row.
    pub fn read_all_fields(&mut self) -> CsvResult<Vec<String>> {
        let mut fields = Vec::new();
        while let Some(field) = self.next_field()? {
            fields.push(field);
            if !self.skip_separator() {
                break;
            }
        }
        Ok(fields)
    }

    fn current(&self) -> Option<char> {
        self.line.get(self.pos).copied()
    }

    /// Next line without its terminator; the terminator is remembered so a
    /// quoted continuation can restore it exactly. A UTF-8 byte-order mark
    /// at the start of the source is dropped.
    fn read_physical_line(&mut self) -> CsvResult<Option<String>> {
        self.buf.clear();
        if self.source.read_line(&mut self.buf)? == 0 {
            self.terminator = "";
            return Ok(None);
        }
        self.terminator = if self.buf.ends_with("\r\n") {
            "\r\n"
        } else if self.buf.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        self.buf.truncate(self.buf.len() - self.terminator.len());

        let text = if std::mem::take(&mut self.at_start) {
            self.buf.strip_prefix('\u{feff}').unwrap_or(&self.buf)
        } else {
            &self.buf
        };
        Ok(Some(text.to_string()))
    }
}
