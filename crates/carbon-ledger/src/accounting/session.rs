use super::domain::ValidationError;
use super::factors::{EmissionFactorSet, FactorError, GridMix};
use super::kpi::{compute_kpis, report_snapshot, KpiSet, ReportSnapshot};
use super::ledger::{record_entry, EntryDraft, Ledger, LedgerEntry};
use super::scenario::{simulate, ScenarioParameters, SimulationResult};
use super::settings::ProjectSettings;
use crate::backup::{self, BackupError, RepairNote};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Factor table, settings and ledger for one assessment, owned by the caller.
///
/// Mutations go through the methods below; every read recomputes from the current snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarbonSession {
    factors: EmissionFactorSet,
    settings: ProjectSettings,
    ledger: Ledger,
}

impl CarbonSession {
    pub fn new(factors: EmissionFactorSet, settings: ProjectSettings) -> Self {
        Self {
            factors,
            settings,
            ledger: Ledger::new(),
        }
    }

    pub fn factors(&self) -> &EmissionFactorSet {
        &self.factors
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ProjectSettings {
        &mut self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn set_factor(&mut self, key: &str, value: f64) -> Result<Option<f64>, FactorError> {
        let previous = self.factors.set(key, value)?;
        info!(key, value, "emission factor updated");
        Ok(previous)
    }

    /// Switches the country preset and overwrites the electricity factor with it.
    pub fn set_grid(&mut self, grid: GridMix) {
        self.settings.grid = grid;
        self.factors.apply_grid(grid);
        info!(grid = grid.key(), "grid preset applied");
    }

    pub fn record_entry(
        &mut self,
        draft: EntryDraft,
        recorded_on: NaiveDate,
    ) -> Result<&LedgerEntry, ValidationError> {
        let entry = self.ledger.record(draft, recorded_on)?;
        info!(
            category = entry.category(),
            item = entry.item(),
            impact_kgco2 = entry.impact_kgco2(),
            "ledger entry recorded"
        );
        Ok(entry)
    }

    /// Records a batch from a capture helper. Nothing is appended unless every draft is valid.
    pub fn record_drafts(
        &mut self,
        drafts: Vec<EntryDraft>,
        recorded_on: NaiveDate,
    ) -> Result<usize, ValidationError> {
        let entries = drafts
            .into_iter()
            .map(|draft| record_entry(draft, recorded_on))
            .collect::<Result<Vec<_>, _>>()?;
        let count = entries.len();
        for entry in entries {
            self.ledger.push(entry);
        }
        info!(count, "ledger batch recorded");
        Ok(count)
    }

    pub fn replace_ledger(&mut self, ledger: Ledger) {
        info!(
            previous = self.ledger.len(),
            replacement = ledger.len(),
            "ledger replaced"
        );
        self.ledger = ledger;
    }

    pub fn clear_ledger(&mut self) {
        info!(cleared = self.ledger.len(), "ledger cleared");
        self.ledger.clear();
    }

    /// Replaces factors, settings and ledger from a backup payload.
    ///
    /// The payload is fully parsed before anything is swapped in; on error the session is
    /// left exactly as it was.
    pub fn restore_backup(
        &mut self,
        raw: &str,
        restored_on: NaiveDate,
    ) -> Result<Vec<RepairNote>, BackupError> {
        let restored = match backup::from_json(raw, restored_on) {
            Ok(restored) => restored,
            Err(err) => {
                warn!(error = %err, "backup rejected; session unchanged");
                return Err(err);
            }
        };

        self.factors = restored.factors;
        self.settings = restored.settings;
        self.ledger = restored.ledger;
        info!(
            entries = self.ledger.len(),
            repairs = restored.repairs.len(),
            "backup restored"
        );
        Ok(restored.repairs)
    }

    pub fn backup_json(&self) -> Result<String, BackupError> {
        backup::to_json(&self.factors, &self.settings, &self.ledger)
    }

    pub fn kpis(&self) -> KpiSet {
        compute_kpis(&self.ledger, &self.settings)
    }

    pub fn simulate(
        &self,
        params: &ScenarioParameters,
    ) -> Result<SimulationResult, ValidationError> {
        simulate(&self.ledger, &self.settings, params)
    }

    pub fn report(&self) -> ReportSnapshot {
        report_snapshot(&self.ledger, &self.settings)
    }
}
