//! Persistence collaborator: the `{ "params": {...}, "db": [...] }` backup document.

pub(crate) mod mapping;
mod parser;

pub use parser::RepairNote;

use crate::accounting::domain::ValidationError;
use crate::accounting::factors::{EmissionFactorSet, FactorError};
use crate::accounting::ledger::Ledger;
use crate::accounting::settings::ProjectSettings;
use chrono::NaiveDate;
use parser::{EntryError, ParamsError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::warn;

#[derive(Debug)]
pub enum BackupError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Structure(String),
    Factor { key: String, source: FactorError },
    Entry { index: usize, reason: String },
    InvalidEntry { index: usize, source: ValidationError },
}

impl std::fmt::Display for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupError::Io(err) => write!(f, "failed to access backup file: {}", err),
            BackupError::Json(err) => write!(f, "backup is not valid JSON: {}", err),
            BackupError::Structure(detail) => write!(f, "malformed backup: {}", detail),
            BackupError::Factor { key, source } => {
                write!(f, "backup factor '{}' rejected: {}", key, source)
            }
            BackupError::Entry { index, reason } => {
                write!(f, "backup entry {} is malformed: {}", index, reason)
            }
            BackupError::InvalidEntry { index, source } => {
                write!(f, "backup entry {} is invalid: {}", index, source)
            }
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Io(err) => Some(err),
            BackupError::Json(err) => Some(err),
            BackupError::Factor { source, .. } => Some(source),
            BackupError::InvalidEntry { source, .. } => Some(source),
            BackupError::Structure(_) | BackupError::Entry { .. } => None,
        }
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<ParamsError> for BackupError {
    fn from(err: ParamsError) -> Self {
        match err {
            ParamsError::Structure(detail) => Self::Structure(detail),
            ParamsError::Factor { key, source } => Self::Factor { key, source },
        }
    }
}

/// Everything a backup restores, plus the repairs applied on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredBackup {
    pub factors: EmissionFactorSet,
    pub settings: ProjectSettings,
    pub ledger: Ledger,
    pub repairs: Vec<RepairNote>,
}

#[derive(Serialize)]
struct BackupDocument<'a> {
    params: Map<String, Value>,
    db: &'a Ledger,
}

pub fn to_json(
    factors: &EmissionFactorSet,
    settings: &ProjectSettings,
    ledger: &Ledger,
) -> Result<String, BackupError> {
    let document = BackupDocument {
        params: parser::params_object(factors, settings),
        db: ledger,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn write_path<P: AsRef<Path>>(
    path: P,
    factors: &EmissionFactorSet,
    settings: &ProjectSettings,
    ledger: &Ledger,
) -> Result<(), BackupError> {
    let json = to_json(factors, settings, ledger)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn from_path<P: AsRef<Path>>(
    path: P,
    restored_on: NaiveDate,
) -> Result<RestoredBackup, BackupError> {
    let file = std::fs::File::open(path)?;
    from_reader(file, restored_on)
}

pub fn from_reader<R: Read>(
    mut reader: R,
    restored_on: NaiveDate,
) -> Result<RestoredBackup, BackupError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    from_json(&raw, restored_on)
}

/// Parses a backup document. Either the whole payload is accepted or an error is returned;
/// entries without a date take `restored_on`.
pub fn from_json(raw: &str, restored_on: NaiveDate) -> Result<RestoredBackup, BackupError> {
    let document: Value = serde_json::from_str(raw)?;
    let object = document
        .as_object()
        .ok_or_else(|| BackupError::Structure("top level must be an object".to_string()))?;

    let mut repairs = Vec::new();
    let (factors, settings) = parser::parse_params(object.get("params"), &mut repairs)?;

    let mut ledger = Ledger::new();
    match object.get("db") {
        Some(Value::Array(rows)) => {
            for (index, row) in rows.iter().enumerate() {
                let entry = parser::parse_entry(index, row, restored_on, &mut repairs).map_err(
                    |err| match err {
                        EntryError::Structure(reason) => BackupError::Entry { index, reason },
                        EntryError::Invalid(source) => BackupError::InvalidEntry { index, source },
                    },
                )?;
                ledger.push(entry);
            }
        }
        Some(_) => return Err(BackupError::Structure("'db' must be an array".to_string())),
        None => repairs.push(RepairNote::MissingSection("db")),
    }

    for note in &repairs {
        warn!(repair = %note, "backup repaired");
    }

    Ok(RestoredBackup {
        factors,
        settings,
        ledger,
        repairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::factors::GridMix;
    use crate::accounting::ledger::EntryDraft;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date")
    }

    fn sample() -> (EmissionFactorSet, ProjectSettings, Ledger) {
        let mut factors = EmissionFactorSet::defaults();
        factors.set("gas", 0.25).expect("valid factor");
        factors.set("biomass_boiler", 0.03).expect("valid factor");
        let settings = ProjectSettings {
            entity_name: "Lycée Jean Moulin".to_string(),
            grid: GridMix::Germany,
            ..ProjectSettings::default()
        };
        let mut ledger = Ledger::new();
        ledger
            .record(
                EntryDraft::new("Energy", "Elec consumption", 1234.5, "kWh", 0.38)
                    .with_uncertainty(15)
                    .with_detail("Scope 2"),
                day(),
            )
            .expect("valid entry");
        (factors, settings, ledger)
    }

    #[test]
    fn save_load_save_is_stable() {
        let (factors, settings, ledger) = sample();
        let first = to_json(&factors, &settings, &ledger).expect("serialize");
        let restored = from_json(&first, day()).expect("restore");

        assert!(restored.repairs.is_empty(), "{:?}", restored.repairs);
        assert_eq!(restored.factors, factors);
        assert_eq!(restored.settings, settings);
        assert_eq!(restored.ledger, ledger);

        let second = to_json(&restored.factors, &restored.settings, &restored.ledger)
            .expect("serialize again");
        assert_eq!(first, second);
    }

    #[test]
    fn legacy_backup_is_repaired() {
        let raw = r#"{
            "params": {
                "entity_name": "Promo 2026",
                "pop_etu": 30,
                "fe_elec": 0.07,
                "country_choice": "Allemagne 🇩🇪",
                "theme": "dark"
            },
            "db": [{
                "Catégorie": "Énergie",
                "Item": "Conso Radiateur Élec",
                "Quantité": "500.0 kWh",
                "Impact_kgCO2": 35.0,
                "Incertitude": 5,
                "Marge": 1.75,
                "Détail": "Scope 2",
                "Date": "2025-01-15"
            }]
        }"#;

        let restored = from_json(raw, day()).expect("legacy payload restores");
        assert_eq!(restored.settings.population.students, 30);
        assert_eq!(restored.settings.grid, GridMix::Germany);
        assert_eq!(restored.factors.get("electricity").expect("electricity"), 0.07);

        let entry = &restored.ledger.entries()[0];
        assert_eq!(entry.category(), "Énergie");
        assert_eq!(entry.unit(), "kWh");
        assert!((entry.quantity() - 500.0).abs() < 1e-9);
        assert!((entry.factor() - 0.07).abs() < 1e-9);
        assert!((entry.impact_kgco2() - 35.0).abs() < 1e-9);
        assert_eq!(
            entry.date(),
            NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
        );

        assert!(restored.repairs.contains(&RepairNote::RenamedParam {
            from: "pop_etu".to_string(),
            to: "pop_students".to_string(),
        }));
        assert!(restored.repairs.contains(&RepairNote::IgnoredParam {
            key: "theme".to_string(),
        }));
        assert!(restored.repairs.contains(&RepairNote::MissingParam {
            key: "shadow_price".to_string(),
        }));
        assert!(restored
            .repairs
            .contains(&RepairNote::DerivedFactor { index: 0 }));
    }

    #[test]
    fn grid_without_electricity_factor_applies_the_preset() {
        let raw = r#"{"params": {"grid": "china", "gas": 0.227}, "db": []}"#;
        let restored = from_json(raw, day()).expect("restores");

        assert_eq!(restored.settings.grid, GridMix::China);
        assert_eq!(restored.factors.get("electricity").expect("electricity"), 0.550);
        assert!(restored.repairs.contains(&RepairNote::ElectricityFromGrid {
            grid: "China",
            factor: 0.550,
        }));
        assert!(!restored.repairs.contains(&RepairNote::MissingParam {
            key: "electricity".to_string(),
        }));
    }

    #[test]
    fn structurally_invalid_payloads_are_rejected() {
        assert!(matches!(
            from_json("[1, 2]", day()),
            Err(BackupError::Structure(_))
        ));
        assert!(matches!(
            from_json(r#"{"db": {"not": "a list"}}"#, day()),
            Err(BackupError::Structure(_))
        ));
        assert!(matches!(
            from_json(r#"{"db": [{"category": "Energy"}]}"#, day()),
            Err(BackupError::Entry { index: 0, .. })
        ));
        assert!(matches!(
            from_json(r#"{"params": {"gas": -1}}"#, day()),
            Err(BackupError::Factor { .. })
        ));
        assert!(matches!(from_json("{", day()), Err(BackupError::Json(_))));
    }

    #[test]
    fn negative_quantities_fail_with_the_entry_index() {
        let raw = r#"{"db": [
            {"category": "Energy", "item": "Elec", "quantity": 10, "unit": "kWh", "factor": 0.06},
            {"category": "Energy", "item": "Elec", "quantity": -10, "unit": "kWh", "factor": 0.06}
        ]}"#;
        match from_json(raw, day()) {
            Err(BackupError::InvalidEntry { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected invalid entry error, got {other:?}"),
        }
    }

    #[test]
    fn missing_sections_start_from_defaults() {
        let restored = from_json("{}", day()).expect("empty object restores");
        assert_eq!(restored.factors, EmissionFactorSet::defaults());
        assert!(restored.ledger.is_empty());
        assert!(restored
            .repairs
            .contains(&RepairNote::MissingSection("params")));
        assert!(restored.repairs.contains(&RepairNote::MissingSection("db")));
    }

    #[test]
    fn mapping_recognizes_legacy_keys() {
        assert_eq!(mapping::lookup_for_tests("fe_voit"), Some("car_thermal"));
        assert_eq!(mapping::lookup_for_tests("jours_ouverture"), Some("operating_days"));
        assert_eq!(mapping::lookup_for_tests("electricity"), None);
    }
}
