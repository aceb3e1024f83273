pub mod capture;
mod entry;

pub use entry::{record_entry, EntryDraft, LedgerEntry};

use super::domain::ValidationError;
use chrono::NaiveDate;
use serde::Serialize;

/// Ordered collection of entries. Insertion order is the only ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Builds an entry from the draft and appends it.
    pub fn record(
        &mut self,
        draft: EntryDraft,
        recorded_on: NaiveDate,
    ) -> Result<&LedgerEntry, ValidationError> {
        let entry = record_entry(draft, recorded_on)?;
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn push(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedgerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_impact_kgco2(&self) -> f64 {
        self.entries.iter().map(LedgerEntry::impact_kgco2).sum()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a LedgerEntry;
    type IntoIter = std::slice::Iter<'a, LedgerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
