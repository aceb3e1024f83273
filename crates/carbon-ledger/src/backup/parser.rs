use super::mapping::{canonical_param_key, grid_for_label};
use crate::accounting::domain::{parse_number, ValidationError};
use crate::accounting::factors::{
    keys as factor_keys, EmissionFactorSet, FactorError, DEFAULT_FACTORS,
};
use crate::accounting::ledger::{record_entry, EntryDraft, LedgerEntry};
use crate::accounting::settings::{keys, ProjectSettings};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// A non-fatal correction applied while restoring a backup.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairNote {
    MissingSection(&'static str),
    MissingParam { key: String },
    RenamedParam { from: String, to: String },
    InvalidParam { key: String, reason: String },
    IgnoredParam { key: String },
    MissingEntryDate { index: usize },
    DerivedFactor { index: usize },
    ElectricityFromGrid { grid: &'static str, factor: f64 },
}

impl fmt::Display for RepairNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairNote::MissingSection(section) => {
                write!(f, "section '{}' missing; started from defaults", section)
            }
            RepairNote::MissingParam { key } => {
                write!(f, "parameter '{}' missing; default injected", key)
            }
            RepairNote::RenamedParam { from, to } => {
                write!(f, "legacy parameter '{}' read as '{}'", from, to)
            }
            RepairNote::InvalidParam { key, reason } => {
                write!(f, "parameter '{}' unusable ({}); default kept", key, reason)
            }
            RepairNote::IgnoredParam { key } => {
                write!(f, "parameter '{}' is not numeric and was ignored", key)
            }
            RepairNote::MissingEntryDate { index } => {
                write!(f, "entry {} had no valid date; restore date used", index)
            }
            RepairNote::DerivedFactor { index } => {
                write!(f, "entry {} had no factor; derived from impact / quantity", index)
            }
            RepairNote::ElectricityFromGrid { grid, factor } => write!(
                f,
                "electricity factor missing; {} grid preset applied ({} kgCO2e/kWh)",
                grid, factor
            ),
        }
    }
}

#[derive(Debug)]
pub(crate) enum ParamsError {
    Structure(String),
    Factor { key: String, source: FactorError },
}

#[derive(Debug)]
pub(crate) enum EntryError {
    Structure(String),
    Invalid(ValidationError),
}

/// Applies a flat `params` object over the defaults.
pub(crate) fn parse_params(
    params: Option<&Value>,
    repairs: &mut Vec<RepairNote>,
) -> Result<(EmissionFactorSet, ProjectSettings), ParamsError> {
    let mut factors = EmissionFactorSet::defaults();
    let mut settings = ProjectSettings::default();

    let params = match params {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ParamsError::Structure(format!(
                "'params' must be an object, found {}",
                json_kind(other)
            )))
        }
        None => {
            repairs.push(RepairNote::MissingSection("params"));
            return Ok((factors, settings));
        }
    };

    let mut seen: Vec<&str> = Vec::with_capacity(params.len());
    for (raw_key, value) in params {
        let (key, renamed) = canonical_param_key(raw_key);
        if renamed {
            repairs.push(RepairNote::RenamedParam {
                from: raw_key.clone(),
                to: key.to_string(),
            });
        }
        seen.push(key);

        if keys::ALL.contains(&key) {
            if let Err(reason) = apply_setting(&mut settings, key, value) {
                repairs.push(RepairNote::InvalidParam {
                    key: key.to_string(),
                    reason,
                });
            }
            continue;
        }

        match numeric_value(value) {
            Some(number) => {
                factors
                    .set(key, number)
                    .map_err(|source| ParamsError::Factor {
                        key: key.to_string(),
                        source,
                    })?;
            }
            None => repairs.push(RepairNote::IgnoredParam {
                key: raw_key.clone(),
            }),
        }
    }

    if seen.contains(&keys::GRID) && !seen.contains(&factor_keys::ELECTRICITY) {
        factors.apply_grid(settings.grid);
        repairs.push(RepairNote::ElectricityFromGrid {
            grid: settings.grid.label(),
            factor: settings.grid.electricity_factor(),
        });
        seen.push(factor_keys::ELECTRICITY);
    }

    let expected = keys::ALL
        .iter()
        .copied()
        .chain(DEFAULT_FACTORS.iter().map(|factor| factor.key));
    for key in expected {
        if !seen.contains(&key) {
            repairs.push(RepairNote::MissingParam {
                key: key.to_string(),
            });
        }
    }

    Ok((factors, settings))
}

fn apply_setting(settings: &mut ProjectSettings, key: &str, value: &Value) -> Result<(), String> {
    match key {
        keys::ENTITY_NAME => {
            settings.entity_name = value
                .as_str()
                .ok_or_else(|| format!("expected text, found {}", json_kind(value)))?
                .to_string();
        }
        keys::POP_STUDENTS => settings.population.students = count_value(value)?,
        keys::POP_APPRENTICES => settings.population.apprentices = count_value(value)?,
        keys::POP_STAFF => settings.population.staff = count_value(value)?,
        keys::OPERATING_DAYS => settings.operating_days = count_value(value)?,
        keys::BUDGET => settings.budget_t_per_capita = amount_value(value)?,
        keys::SHADOW_PRICE => settings.shadow_price = amount_value(value)?,
        keys::GRID => {
            let label = value
                .as_str()
                .ok_or_else(|| format!("expected text, found {}", json_kind(value)))?;
            settings.grid =
                grid_for_label(label).ok_or_else(|| format!("unknown grid '{}'", label))?;
        }
        _ => {}
    }
    Ok(())
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_number("param", text).ok(),
        _ => None,
    }
}

fn amount_value(value: &Value) -> Result<f64, String> {
    let number =
        numeric_value(value).ok_or_else(|| format!("expected number, found {}", json_kind(value)))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!("expected a non-negative number, found {}", number));
    }
    Ok(number)
}

fn count_value(value: &Value) -> Result<u32, String> {
    let number = amount_value(value)?;
    if number > f64::from(u32::MAX) {
        return Err(format!("{} is too large", number));
    }
    Ok(number.round() as u32)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One persisted entry, accepting both current and legacy field names.
#[derive(Debug, Deserialize)]
struct EntryRow {
    #[serde(alias = "Catégorie", default)]
    category: String,
    #[serde(alias = "Item", default)]
    item: String,
    #[serde(alias = "Quantité")]
    quantity: RawQuantity,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    factor: Option<f64>,
    #[serde(alias = "Impact_kgCO2", default)]
    impact_kgco2: Option<f64>,
    #[serde(alias = "Incertitude", default)]
    uncertainty_pct: Option<f64>,
    #[serde(alias = "Détail", default)]
    detail: String,
    #[serde(alias = "Date", default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(f64),
    Text(String),
}

impl RawQuantity {
    /// Splits `"500 kWh"` into its number and unit.
    fn resolve(self) -> Result<(f64, Option<String>), ValidationError> {
        match self {
            RawQuantity::Number(value) => Ok((value, None)),
            RawQuantity::Text(text) => {
                let trimmed = text.trim();
                let (number, unit) = match trimmed.split_once(char::is_whitespace) {
                    Some((number, unit)) => (number, Some(unit.trim().to_string())),
                    None => (trimmed, None),
                };
                Ok((parse_number("quantity", number)?, unit))
            }
        }
    }
}

/// Rebuilds one entry; impact and margin are re-derived, never trusted from the payload.
pub(crate) fn parse_entry(
    index: usize,
    value: &Value,
    restored_on: NaiveDate,
    repairs: &mut Vec<RepairNote>,
) -> Result<LedgerEntry, EntryError> {
    let row = EntryRow::deserialize(value)
        .map_err(|err| EntryError::Structure(err.to_string()))?;

    let (quantity, embedded_unit) = row.quantity.resolve().map_err(EntryError::Invalid)?;
    let unit = row
        .unit
        .filter(|unit| !unit.is_empty())
        .or(embedded_unit)
        .unwrap_or_default();

    let factor = match row.factor {
        Some(factor) => factor,
        None => {
            repairs.push(RepairNote::DerivedFactor { index });
            match row.impact_kgco2 {
                Some(impact) if quantity > 0.0 => impact / quantity,
                _ => 0.0,
            }
        }
    };

    let date = match row
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
    {
        Some(date) => date,
        None => {
            repairs.push(RepairNote::MissingEntryDate { index });
            restored_on
        }
    };

    let draft = EntryDraft::new(row.category, row.item, quantity, unit, factor)
        .with_uncertainty(row.uncertainty_pct.unwrap_or(0.0).round() as i64)
        .with_detail(row.detail);

    record_entry(draft, date).map_err(EntryError::Invalid)
}

/// Flat params object written by [`super::to_json`].
pub(crate) fn params_object(
    factors: &EmissionFactorSet,
    settings: &ProjectSettings,
) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(
        keys::ENTITY_NAME.to_string(),
        Value::from(settings.entity_name.clone()),
    );
    params.insert(
        keys::POP_STUDENTS.to_string(),
        Value::from(settings.population.students),
    );
    params.insert(
        keys::POP_APPRENTICES.to_string(),
        Value::from(settings.population.apprentices),
    );
    params.insert(
        keys::POP_STAFF.to_string(),
        Value::from(settings.population.staff),
    );
    params.insert(
        keys::OPERATING_DAYS.to_string(),
        Value::from(settings.operating_days),
    );
    params.insert(
        keys::BUDGET.to_string(),
        Value::from(settings.budget_t_per_capita),
    );
    params.insert(
        keys::SHADOW_PRICE.to_string(),
        Value::from(settings.shadow_price),
    );
    params.insert(keys::GRID.to_string(), Value::from(settings.grid.key()));
    for (key, value) in factors.iter() {
        params.insert(key.to_string(), Value::from(value));
    }
    params
}
