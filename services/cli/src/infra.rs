use carbon_ledger::accounting::CarbonSession;
use carbon_ledger::backup;
use carbon_ledger::error::AppError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the session from the backup file and writes it back after mutations.
#[derive(Debug, Clone)]
pub(crate) struct SessionStore {
    path: PathBuf,
    operating_days_override: Option<u32>,
    today: NaiveDate,
}

impl SessionStore {
    pub(crate) fn new(path: PathBuf, operating_days_override: Option<u32>, today: NaiveDate) -> Self {
        Self {
            path,
            operating_days_override,
            today,
        }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// A missing backup starts a fresh session with default factors and settings.
    pub(crate) fn load(&self) -> Result<CarbonSession, AppError> {
        let mut session = CarbonSession::default();
        if self.path.exists() {
            let raw = std::fs::read_to_string(&self.path)?;
            // Each repair is already logged by the backup layer.
            let repairs = session.restore_backup(&raw, self.today)?;
            info!(path = %self.path.display(), repairs = repairs.len(), "backup loaded");
        } else {
            info!(path = %self.path.display(), "no backup found; starting a new session");
        }

        if let Some(days) = self.operating_days_override {
            session.settings_mut().operating_days = days;
        }
        Ok(session)
    }

    pub(crate) fn save(&self, session: &CarbonSession) -> Result<(), AppError> {
        backup::write_path(
            &self.path,
            session.factors(),
            session.settings(),
            session.ledger(),
        )?;
        info!(path = %self.path.display(), entries = session.ledger().len(), "session saved");
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_percent(raw: &str) -> Result<f64, String> {
    let value = carbon_ledger::accounting::parse_number("percentage", raw)
        .map_err(|err| err.to_string())?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("'{raw}' must be between 0 and 100"));
    }
    Ok(value)
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    let value = carbon_ledger::accounting::parse_number("amount", raw)
        .map_err(|err| err.to_string())?;
    if value < 0.0 {
        return Err(format!("'{raw}' must not be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date(" 2024-09-02 "),
            Ok(NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date"))
        );
        assert!(parse_date("02/09/2024").is_err());
    }

    #[test]
    fn parse_percent_accepts_decimal_comma() {
        assert_eq!(parse_percent("12,5"), Ok(12.5));
        assert!(parse_percent("120").is_err());
        assert!(parse_percent("lots").is_err());
    }

    #[test]
    fn parse_amount_rejects_negative_values() {
        assert_eq!(parse_amount("1500,5"), Ok(1500.5));
        assert!(parse_amount("-3").is_err());
    }

    #[test]
    fn load_restores_a_repaired_backup_and_save_writes_it_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("carbon_backup.json");
        std::fs::write(&path, r#"{"params": {"pop_etu": 40}, "db": []}"#).expect("seed backup");
        let today = NaiveDate::from_ymd_opt(2025, 2, 3).expect("valid date");
        let store = SessionStore::new(path.clone(), Some(150), today);

        let session = store.load().expect("repairable backup loads");
        assert_eq!(session.settings().population.students, 40);
        assert_eq!(session.settings().operating_days, 150);

        store.save(&session).expect("saved");
        let reloaded = store.load().expect("saved backup loads");
        assert_eq!(reloaded, session);
    }
}
