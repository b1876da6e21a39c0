use super::{ReconcileError, SourceRole};
use crate::sources::{PayloadSource, SourceError};
use std::io::{self, BufRead, BufReader, Read};
use tracing::{debug, warn};

/// Lazy, single-pass sequence of raw candidate names.
///
/// The first non-blank line is a header and is discarded; every later line
/// contributes its first field. Lines may carry any number of fields and blank
/// lines are skipped. Quoting never spans a line break, so an unbalanced quote
/// costs at most its own row. After the first read error the stream yields
/// nothing more.
pub struct CandidateStream<R: Read> {
    reader: BufReader<R>,
    fields: csv::ReaderBuilder,
    line: Vec<u8>,
    record: csv::ByteRecord,
    location: String,
    header_seen: bool,
    rows: usize,
    finished: bool,
}

impl CandidateStream<Box<dyn Read>> {
    pub fn open(source: &dyn PayloadSource, delimiter: u8) -> Result<Self, ReconcileError> {
        let reader = source
            .open()
            .map_err(|cause| ReconcileError::SourceUnavailable {
                role: SourceRole::Candidate,
                location: source.location().to_string(),
                source: cause,
            })?;

        Ok(Self::from_reader(reader, source.location(), delimiter))
    }
}

impl<R: Read> CandidateStream<R> {
    pub fn from_reader(reader: R, location: impl Into<String>, delimiter: u8) -> Self {
        let mut fields = csv::ReaderBuilder::new();
        fields
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::None);

        Self {
            reader: BufReader::new(reader),
            fields,
            line: Vec::new(),
            record: csv::ByteRecord::new(),
            location: location.into(),
            header_seen: false,
            rows: 0,
            finished: false,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Loads the next non-blank line into `self.line`, without its terminator.
    fn next_line(&mut self) -> io::Result<bool> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(false);
            }
            while matches!(self.line.last(), Some(b'\n' | b'\r')) {
                self.line.pop();
            }
            if !self.line.is_empty() {
                return Ok(true);
            }
        }
    }

    fn first_field(&mut self) -> Result<String, csv::Error> {
        if has_unbalanced_quote(&self.line) {
            warn!(
                location = %self.location,
                row = self.rows + 1,
                "candidate row opens a quote it never closes; field runs to the end of the line"
            );
        }

        let mut fields = self.fields.from_reader(self.line.as_slice());
        fields.read_byte_record(&mut self.record)?;
        let first = self.record.get(0).unwrap_or_default();
        Ok(String::from_utf8_lossy(first).into_owned())
    }

    fn read_row(&mut self) -> Result<Option<String>, SourceError> {
        if !self.header_seen {
            if !self.next_line().map_err(SourceError::Read)? {
                return Ok(None);
            }
            self.header_seen = true;
        }

        if !self.next_line().map_err(SourceError::Read)? {
            return Ok(None);
        }
        let name = self.first_field().map_err(SourceError::Csv)?;
        self.rows += 1;
        Ok(Some(name))
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.rows == 0 {
            warn!(location = %self.location, "candidate source has no data rows");
        } else {
            debug!(location = %self.location, rows = self.rows, "candidate source exhausted");
        }
    }
}

fn has_unbalanced_quote(line: &[u8]) -> bool {
    line.first() == Some(&b'"') && line.iter().filter(|&&byte| byte == b'"').count() % 2 == 1
}

impl<R: Read> Iterator for CandidateStream<R> {
    type Item = Result<String, ReconcileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_row() {
            Ok(Some(name)) => Some(Ok(name)),
            Ok(None) => {
                self.finish();
                None
            }
            Err(cause) => {
                self.finished = true;
                Some(Err(ReconcileError::SourceUnavailable {
                    role: SourceRole::Candidate,
                    location: self.location.clone(),
                    source: cause,
                }))
            }
        }
    }
}
