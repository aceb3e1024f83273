//! Bulk-import collaborator: ledger spreadsheets and school calendars as CSV.

mod parser;

use crate::accounting::ledger::{record_entry, Ledger};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read import file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

/// Replacement ledger built from the rows that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerImport {
    pub ledger: Ledger,
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

pub struct LedgerCsvImporter;

impl LedgerCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        default_date: NaiveDate,
    ) -> Result<LedgerImport, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, default_date)
    }

    /// Rows missing a date take `default_date`. Invalid rows are skipped and reported.
    pub fn from_reader<R: Read>(
        reader: R,
        default_date: NaiveDate,
    ) -> Result<LedgerImport, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut ledger = Ledger::new();
        let mut rejected = Vec::new();
        let mut record = csv::StringRecord::new();

        loop {
            let line = match csv_reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => record.position().map(|pos| pos.line()).unwrap_or_default(),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    let line = err.position().map(|pos| pos.line()).unwrap_or_default();
                    reject(&mut rejected, line, err.to_string());
                    continue;
                }
            };

            let row: parser::LedgerRow = match record.deserialize(Some(&headers)) {
                Ok(row) => row,
                Err(err) => {
                    reject(&mut rejected, line, err.to_string());
                    continue;
                }
            };

            let outcome = row
                .into_draft(default_date)
                .map_err(|err| err.to_string())
                .and_then(|(draft, date)| {
                    record_entry(draft, date).map_err(|err| err.to_string())
                });
            match outcome {
                Ok(entry) => ledger.push(entry),
                Err(reason) => reject(&mut rejected, line, reason),
            }
        }

        let imported = ledger.len();
        info!(imported, rejected = rejected.len(), "ledger CSV imported");
        Ok(LedgerImport {
            ledger,
            imported,
            rejected,
        })
    }
}

fn reject(rejected: &mut Vec<RejectedRow>, line: u64, reason: String) {
    warn!(line, reason = %reason, "import row rejected");
    rejected.push(RejectedRow { line, reason });
}

/// One row per teaching day, optionally labelled with a day type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarImport {
    pub rows: usize,
    pub tally: BTreeMap<String, usize>,
}

impl CalendarImport {
    pub fn operating_days(&self) -> u32 {
        u32::try_from(self.rows).unwrap_or(u32::MAX)
    }
}

pub struct CalendarCsvImporter;

impl CalendarCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CalendarImport, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CalendarImport, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let tally_column = parser::calendar_tally_column(csv_reader.headers()?);

        let mut rows = 0;
        let mut tally = BTreeMap::new();
        for record in csv_reader.records() {
            let record = record?;
            rows += 1;
            if let Some(value) = tally_column.and_then(|column| record.get(column)) {
                if !value.is_empty() {
                    *tally.entry(value.to_string()).or_insert(0) += 1;
                }
            }
        }

        Ok(CalendarImport { rows, tally })
    }
}
