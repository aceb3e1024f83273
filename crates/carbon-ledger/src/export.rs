//! Reporting collaborator: CSV export of the ledger with the derived scope column.

use crate::accounting::ledger::{Ledger, LedgerEntry};
use crate::accounting::scope::classify_scope;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    category: &'a str,
    item: &'a str,
    quantity: f64,
    unit: &'a str,
    factor: f64,
    impact_kgco2: f64,
    uncertainty_pct: u8,
    margin_kgco2: f64,
    detail: &'a str,
    date: NaiveDate,
    scope: &'static str,
}

impl<'a> ExportRow<'a> {
    fn from_entry(entry: &'a LedgerEntry) -> Self {
        Self {
            category: entry.category(),
            item: entry.item(),
            quantity: entry.quantity(),
            unit: entry.unit(),
            factor: entry.factor(),
            impact_kgco2: entry.impact_kgco2(),
            uncertainty_pct: entry.uncertainty_pct(),
            margin_kgco2: entry.margin_kgco2(),
            detail: entry.detail(),
            date: entry.date(),
            scope: classify_scope(entry).label(),
        }
    }
}

pub fn write_ledger_csv<W: Write>(writer: W, ledger: &Ledger) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in ledger {
        csv_writer.serialize(ExportRow::from_entry(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_ledger_to_path<P: AsRef<Path>>(path: P, ledger: &Ledger) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_ledger_csv(file, ledger)
}
