use super::domain::{ensure_non_negative, ValidationError};
use super::settings::keys as setting_keys;
use crate::backup::mapping::is_legacy_param_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod keys {
    pub const ELECTRICITY: &str = "electricity";
    pub const GAS: &str = "gas";
    pub const WATER: &str = "water";
    pub const WASTE: &str = "waste";
    pub const CAR_THERMAL: &str = "car_thermal";
    pub const CAR_ELECTRIC: &str = "car_electric";
    pub const PLANE_SHORT: &str = "plane_short";
    pub const PLANE_LONG: &str = "plane_long";
    pub const TGV: &str = "tgv";
    pub const REGIONAL_TRAIN: &str = "regional_train";
    pub const BUS: &str = "bus";
    pub const COACH: &str = "coach";
    pub const BEEF_MEAL: &str = "beef_meal";
    pub const POULTRY_MEAL: &str = "poultry_meal";
    pub const VEGETARIAN_MEAL: &str = "vegetarian_meal";
    pub const COFFEE: &str = "coffee";
    pub const LAPTOP_MANUFACTURING: &str = "laptop_manufacturing";
    pub const DESKTOP_MANUFACTURING: &str = "desktop_manufacturing";
    pub const SCREEN_MANUFACTURING: &str = "screen_manufacturing";
    pub const SMARTPHONE_MANUFACTURING: &str = "smartphone_manufacturing";
    pub const PROJECTOR_MANUFACTURING: &str = "projector_manufacturing";
    pub const FURNITURE_UNIT: &str = "furniture_unit";
    pub const GENERIC_CONSUMABLE: &str = "generic_consumable";
}

/// Built-in coefficient, in kgCO2e per declared unit.
#[derive(Debug, Clone, Copy)]
pub struct FactorDefault {
    pub key: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

pub const DEFAULT_FACTORS: &[FactorDefault] = &[
    FactorDefault { key: keys::ELECTRICITY, value: 0.060, unit: "kWh" },
    FactorDefault { key: keys::GAS, value: 0.227, unit: "kWh" },
    FactorDefault { key: keys::WATER, value: 0.132, unit: "m3" },
    FactorDefault { key: keys::WASTE, value: 0.200, unit: "kg" },
    FactorDefault { key: keys::CAR_THERMAL, value: 0.190, unit: "km" },
    FactorDefault { key: keys::CAR_ELECTRIC, value: 0.060, unit: "km" },
    FactorDefault { key: keys::PLANE_SHORT, value: 0.258, unit: "km" },
    FactorDefault { key: keys::PLANE_LONG, value: 0.230, unit: "km" },
    FactorDefault { key: keys::TGV, value: 0.002, unit: "km" },
    FactorDefault { key: keys::REGIONAL_TRAIN, value: 0.030, unit: "km" },
    FactorDefault { key: keys::BUS, value: 0.100, unit: "km" },
    FactorDefault { key: keys::COACH, value: 0.030, unit: "km" },
    FactorDefault { key: keys::BEEF_MEAL, value: 7.0, unit: "meal" },
    FactorDefault { key: keys::POULTRY_MEAL, value: 1.6, unit: "meal" },
    FactorDefault { key: keys::VEGETARIAN_MEAL, value: 0.5, unit: "meal" },
    FactorDefault { key: keys::COFFEE, value: 5.0, unit: "kg" },
    FactorDefault { key: keys::LAPTOP_MANUFACTURING, value: 156.0, unit: "unit" },
    FactorDefault { key: keys::DESKTOP_MANUFACTURING, value: 350.0, unit: "unit" },
    FactorDefault { key: keys::SCREEN_MANUFACTURING, value: 200.0, unit: "unit" },
    FactorDefault { key: keys::SMARTPHONE_MANUFACTURING, value: 60.0, unit: "unit" },
    FactorDefault { key: keys::PROJECTOR_MANUFACTURING, value: 100.0, unit: "unit" },
    FactorDefault { key: keys::FURNITURE_UNIT, value: 1.0, unit: "unit" },
    FactorDefault { key: keys::GENERIC_CONSUMABLE, value: 1.0, unit: "unit" },
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactorError {
    #[error("emission factor '{0}' is not defined")]
    Unknown(String),
    #[error("'{0}' is reserved for a project setting and cannot name an emission factor")]
    Reserved(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Active coefficient table. Keys are never removed, only overwritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmissionFactorSet {
    factors: BTreeMap<String, f64>,
}

impl EmissionFactorSet {
    pub fn defaults() -> Self {
        let factors = DEFAULT_FACTORS
            .iter()
            .map(|factor| (factor.key.to_string(), factor.value))
            .collect();
        Self { factors }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let factors = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        Self { factors }
    }

    /// Resolves a key, failing loudly rather than defaulting to zero.
    pub fn get(&self, key: &str) -> Result<f64, FactorError> {
        self.factors
            .get(key)
            .copied()
            .ok_or_else(|| FactorError::Unknown(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factors.contains_key(key)
    }

    /// Overwrites (or adds) a coefficient and returns the previous value.
    ///
    /// Factors share the backup `params` object with the settings, so setting names and their
    /// legacy aliases are refused.
    pub fn set(&mut self, key: &str, value: f64) -> Result<Option<f64>, FactorError> {
        if setting_keys::ALL.contains(&key.trim()) || is_legacy_param_key(key) {
            return Err(FactorError::Reserved(key.to_string()));
        }
        let value = ensure_non_negative("emission factor", value)?;
        Ok(self.factors.insert(key.to_string(), value))
    }

    pub fn apply_grid(&mut self, grid: GridMix) {
        self.factors
            .insert(keys::ELECTRICITY.to_string(), grid.electricity_factor());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for EmissionFactorSet {
    fn default() -> Self {
        Self::defaults()
    }
}

pub fn default_unit(key: &str) -> Option<&'static str> {
    DEFAULT_FACTORS
        .iter()
        .find(|factor| factor.key == key)
        .map(|factor| factor.unit)
}

/// Electricity mix presets, selected by site location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMix {
    France,
    Germany,
    EuropeAverage,
    Usa,
    China,
}

impl GridMix {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::France,
            Self::Germany,
            Self::EuropeAverage,
            Self::Usa,
            Self::China,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::France => "France",
            Self::Germany => "Germany",
            Self::EuropeAverage => "Europe (average)",
            Self::Usa => "USA",
            Self::China => "China",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::France => "france",
            Self::Germany => "germany",
            Self::EuropeAverage => "europe_average",
            Self::Usa => "usa",
            Self::China => "china",
        }
    }

    pub const fn electricity_factor(self) -> f64 {
        match self {
            Self::France => 0.060,
            Self::Germany => 0.380,
            Self::EuropeAverage => 0.255,
            Self::Usa => 0.370,
            Self::China => 0.550,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::France => "Nuclear-heavy, low-carbon mix",
            Self::Germany => "Coal and renewables mix",
            Self::EuropeAverage => "Continental average",
            Self::Usa => "Fossil-dominated mix",
            Self::China => "Coal-dominated mix",
        }
    }

    /// Accepts the snake_case key or a label, ignoring case and trailing decoration.
    pub fn from_key(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        Self::ordered().into_iter().find(|grid| {
            lowered == grid.key() || lowered.starts_with(&grid.label().to_lowercase())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_declared_key() {
        let factors = EmissionFactorSet::defaults();
        assert_eq!(factors.len(), DEFAULT_FACTORS.len());
        assert_eq!(factors.get(keys::CAR_THERMAL).expect("car factor"), 0.190);
        assert_eq!(factors.get(keys::BEEF_MEAL).expect("beef factor"), 7.0);
    }

    #[test]
    fn unknown_keys_fail_loudly() {
        let factors = EmissionFactorSet::defaults();
        assert_eq!(
            factors.get("hydrogen_bus"),
            Err(FactorError::Unknown("hydrogen_bus".to_string()))
        );
    }

    #[test]
    fn set_overwrites_and_rejects_negative_values() {
        let mut factors = EmissionFactorSet::defaults();
        let previous = factors.set(keys::GAS, 0.25).expect("valid factor");
        assert_eq!(previous, Some(0.227));
        assert_eq!(factors.get(keys::GAS).expect("gas"), 0.25);

        let error = factors.set(keys::GAS, -1.0).expect_err("negative rejected");
        assert!(matches!(
            error,
            FactorError::Invalid(ValidationError::Negative { .. })
        ));
        assert_eq!(factors.get(keys::GAS).expect("gas unchanged"), 0.25);
    }

    #[test]
    fn setting_names_cannot_become_factors() {
        let mut factors = EmissionFactorSet::defaults();
        for key in ["budget_co2", "grid", "operating_days", "pop_etu", "fe_elec"] {
            match factors.set(key, 0.5) {
                Err(FactorError::Reserved(reserved)) => assert_eq!(reserved, key),
                other => panic!("expected reserved key error for {key}, got {other:?}"),
            }
        }
        assert_eq!(factors, EmissionFactorSet::defaults());
    }

    #[test]
    fn grid_presets_override_electricity() {
        let mut factors = EmissionFactorSet::defaults();
        factors.apply_grid(GridMix::Germany);
        assert_eq!(factors.get(keys::ELECTRICITY).expect("elec"), 0.380);
    }

    #[test]
    fn grid_lookup_accepts_keys_and_labels() {
        assert_eq!(GridMix::from_key("europe_average"), Some(GridMix::EuropeAverage));
        assert_eq!(GridMix::from_key("USA"), Some(GridMix::Usa));
        assert_eq!(GridMix::from_key("Germany (DE)"), Some(GridMix::Germany));
        assert_eq!(GridMix::from_key("atlantis"), None);
    }
}
