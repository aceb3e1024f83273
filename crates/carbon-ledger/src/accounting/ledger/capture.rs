//! Draft builders for the activity forms: inventory, commuting, heating, consumables, IT fleet.
//!
//! Every builder resolves its coefficients from the active [`EmissionFactorSet`], so a missing
//! key is reported instead of silently producing a zero-impact line.

use super::super::domain::Category;
use super::super::factors::{keys, EmissionFactorSet, FactorError};
use super::super::settings::ProjectSettings;
use super::EntryDraft;
use serde::{Deserialize, Serialize};

/// Hours per operating day a powered appliance is assumed to run.
pub const DAILY_POWERED_HOURS: f64 = 8.0;
pub const FURNITURE_AMORTISATION_YEARS: u32 = 10;
pub const SCHOOL_WEEK_DAYS: u32 = 5;
pub const EXCHANGE_MONTH_DAYS: u32 = 20;
pub const HEATING_UNCERTAINTY_PCT: i64 = 10;
pub const FLEET_UNCERTAINTY_PCT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    Furniture,
    /// Appliance drawing power; `magnitude` is its rating in watts.
    Powered,
}

/// One row of the classroom equipment inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub label: String,
    pub quantity: f64,
    #[serde(default)]
    pub magnitude: f64,
    pub kind: InventoryKind,
    #[serde(default)]
    pub uncertainty_pct: i64,
}

pub fn inventory_drafts(
    rows: &[InventoryRow],
    factors: &EmissionFactorSet,
    settings: &ProjectSettings,
) -> Result<Vec<EntryDraft>, FactorError> {
    let mut drafts = Vec::with_capacity(rows.len());
    for row in rows {
        let draft = match row.kind {
            InventoryKind::Furniture => EntryDraft::new(
                Category::Building.label(),
                row.label.clone(),
                row.quantity,
                "u",
                factors.get(keys::FURNITURE_UNIT)?,
            )
            .with_detail(format!(
                "Amortised over {FURNITURE_AMORTISATION_YEARS} years"
            )),
            InventoryKind::Powered => {
                let kwh = row.quantity
                    * row.magnitude
                    * DAILY_POWERED_HOURS
                    * f64::from(settings.operating_days)
                    / 1000.0;
                EntryDraft::new(
                    Category::Energy.label(),
                    format!("Consumption {}", row.label),
                    kwh,
                    "kWh",
                    factors.get(keys::ELECTRICITY)?,
                )
                .with_detail("Scope 2")
            }
        };
        drafts.push(draft.with_uncertainty(row.uncertainty_pct));
    }
    Ok(drafts)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum TravellerProfile {
    FullTimeStudent,
    Apprentice { school_weeks: u32 },
    ExchangeStudent { months: u32 },
    Staff { days_on_site: u32 },
    GuestLecturer { visits: u32 },
}

impl TravellerProfile {
    pub fn presence_days(self, settings: &ProjectSettings) -> u32 {
        match self {
            Self::FullTimeStudent => settings.operating_days,
            Self::Apprentice { school_weeks } => school_weeks.saturating_mul(SCHOOL_WEEK_DAYS),
            Self::ExchangeStudent { months } => months.saturating_mul(EXCHANGE_MONTH_DAYS),
            Self::Staff { days_on_site } => days_on_site,
            Self::GuestLecturer { visits } => visits,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTimeStudent => "full-time students",
            Self::Apprentice { .. } => "apprentices",
            Self::ExchangeStudent { .. } => "exchange students",
            Self::Staff { .. } => "staff",
            Self::GuestLecturer { .. } => "guest lecturers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    CarThermal,
    CarElectric,
    RegionalTrain,
    Tgv,
    Bus,
    Plane,
}

impl TravelMode {
    pub const fn factor_key(self) -> &'static str {
        match self {
            Self::CarThermal => keys::CAR_THERMAL,
            Self::CarElectric => keys::CAR_ELECTRIC,
            Self::RegionalTrain => keys::REGIONAL_TRAIN,
            Self::Tgv => keys::TGV,
            Self::Bus => keys::BUS,
            Self::Plane => keys::PLANE_LONG,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CarThermal => "Car (thermal)",
            Self::CarElectric => "Car (electric)",
            Self::RegionalTrain => "Regional train",
            Self::Tgv => "High-speed train",
            Self::Bus => "Bus",
            Self::Plane => "Plane",
        }
    }
}

/// A group of identical travellers sharing a mode and a round-trip distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommuteFlow {
    pub profile: TravellerProfile,
    pub mode: TravelMode,
    pub round_trip_km: f64,
    pub travellers: u32,
    #[serde(default)]
    pub uncertainty_pct: i64,
}

impl CommuteFlow {
    pub fn draft(
        &self,
        factors: &EmissionFactorSet,
        settings: &ProjectSettings,
    ) -> Result<EntryDraft, FactorError> {
        let days = self.profile.presence_days(settings);
        let passenger_km = self.round_trip_km * f64::from(days) * f64::from(self.travellers);
        Ok(EntryDraft::new(
            Category::Mobility.label(),
            format!("Commute {}", self.profile.label()),
            passenger_km,
            "km.pax",
            factors.get(self.mode.factor_key())?,
        )
        .with_uncertainty(self.uncertainty_pct)
        .with_detail(format!("{} | {days} d/yr", self.mode.label())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingSource {
    Gas,
    Electric,
    DistrictNetwork,
}

impl HeatingSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gas => "Gas",
            Self::Electric => "Electricity",
            Self::DistrictNetwork => "District network",
        }
    }

    /// District networks are billed like electricity.
    pub const fn factor_key(self) -> &'static str {
        match self {
            Self::Gas => keys::GAS,
            Self::Electric | Self::DistrictNetwork => keys::ELECTRICITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatedSurface {
    pub surface_m2: f64,
    pub source: HeatingSource,
    pub kwh_per_m2_year: f64,
}

impl HeatedSurface {
    pub fn draft(&self, factors: &EmissionFactorSet) -> Result<EntryDraft, FactorError> {
        Ok(EntryDraft::new(
            Category::Building.label(),
            format!("Heating ({})", self.source.label()),
            self.surface_m2 * self.kwh_per_m2_year,
            "kWh",
            factors.get(self.source.factor_key())?,
        )
        .with_uncertainty(HEATING_UNCERTAINTY_PCT)
        .with_detail(format!("{} m²", self.surface_m2)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumable {
    BeefMeal,
    VegetarianMeal,
    Coffee,
    Paper,
    Goodies,
}

impl Consumable {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeefMeal => "Beef meal",
            Self::VegetarianMeal => "Vegetarian meal",
            Self::Coffee => "Coffee",
            Self::Paper => "Paper (reams)",
            Self::Goodies => "Goodies",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::BeefMeal | Self::VegetarianMeal => "meal",
            Self::Coffee => "kg",
            Self::Paper | Self::Goodies => "u",
        }
    }

    pub const fn factor_key(self) -> &'static str {
        match self {
            Self::BeefMeal => keys::BEEF_MEAL,
            Self::VegetarianMeal => keys::VEGETARIAN_MEAL,
            Self::Coffee => keys::COFFEE,
            Self::Paper | Self::Goodies => keys::GENERIC_CONSUMABLE,
        }
    }

    pub fn draft(
        self,
        quantity: f64,
        factors: &EmissionFactorSet,
    ) -> Result<EntryDraft, FactorError> {
        Ok(EntryDraft::new(
            Category::Purchases.label(),
            self.label(),
            quantity,
            self.unit(),
            factors.get(self.factor_key())?,
        )
        .with_detail("Routine consumption"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Laptop,
    Desktop,
    Screen,
    Smartphone,
    Projector,
}

impl Device {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Laptop => "Laptop",
            Self::Desktop => "Desktop",
            Self::Screen => "Screen",
            Self::Smartphone => "Smartphone",
            Self::Projector => "Projector",
        }
    }

    pub const fn factor_key(self) -> &'static str {
        match self {
            Self::Laptop => keys::LAPTOP_MANUFACTURING,
            Self::Desktop => keys::DESKTOP_MANUFACTURING,
            Self::Screen => keys::SCREEN_MANUFACTURING,
            Self::Smartphone => keys::SMARTPHONE_MANUFACTURING,
            Self::Projector => keys::PROJECTOR_MANUFACTURING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceFleet {
    pub device: Device,
    pub units: f64,
    pub lifespan_years: u32,
}

impl DeviceFleet {
    /// Manufacturing footprint spread over the years the devices are kept.
    pub fn draft(&self, factors: &EmissionFactorSet) -> Result<EntryDraft, FactorError> {
        let lifespan = self.lifespan_years.max(1);
        let yearly_factor = factors.get(self.device.factor_key())? / f64::from(lifespan);
        Ok(EntryDraft::new(
            Category::Digital.label(),
            format!("Fleet {}", self.device.label()),
            self.units,
            "u",
            yearly_factor,
        )
        .with_uncertainty(FLEET_UNCERTAINTY_PCT)
        .with_detail(format!("Amortised over {lifespan} years")))
    }
}
