use super::super::domain::{ensure_non_negative, ensure_range, ValidationError};
use super::segments::ImpactDomain;
use serde::{Deserialize, Serialize};

pub const WORK_DAYS_PER_WEEK: f64 = 5.0;
/// Share of the remaining mobility volume assumed to be air travel.
pub const AIR_SHARE_OF_MOBILITY: f64 = 0.30;
/// Emission cut when an air trip moves to rail.
pub const RAIL_SHIFT_CUT: f64 = 0.90;
pub const SOFT_MOBILITY_SHARE: f64 = 0.15;
pub const LED_RESIDUAL: f64 = 0.90;
/// Residual grid factor under a renewable supply contract.
pub const GREEN_CONTRACT_RESIDUAL: f64 = 0.10;
pub const IT_AMORTIZATION_YEARS: f64 = 4.0;
pub const REFURBISHED_RESIDUAL: f64 = 0.2;
/// Footprint of a vegetarian meal relative to the baseline meal.
pub const VEGETARIAN_RESIDUAL: f64 = 0.15;

pub const MAX_CARPOOL_OCCUPANCY: f64 = 4.0;
pub const MIN_POP_GROWTH_PCT: f64 = -100.0;
pub const MAX_POP_GROWTH_PCT: f64 = 1000.0;

/// Lever configuration for one what-if run. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    pub pop_growth_pct: f64,
    pub remote_days_per_week: f64,
    pub mobility_sobriety_pct: f64,
    pub rail_shift: bool,
    pub carpool_occupancy: f64,
    pub soft_mobility: bool,
    pub heat_sobriety_pct: f64,
    pub led_relamping: bool,
    pub solar_pct: f64,
    pub green_electricity: bool,
    pub it_extra_years: f64,
    pub refurbished_pct: f64,
    pub vegetarian_pct: f64,
    pub waste_reduction_pct: f64,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            pop_growth_pct: 0.0,
            remote_days_per_week: 0.0,
            mobility_sobriety_pct: 0.0,
            rail_shift: false,
            carpool_occupancy: 1.0,
            soft_mobility: false,
            heat_sobriety_pct: 0.0,
            led_relamping: false,
            solar_pct: 0.0,
            green_electricity: false,
            it_extra_years: 0.0,
            refurbished_pct: 0.0,
            vegetarian_pct: 0.0,
            waste_reduction_pct: 0.0,
        }
    }
}

impl ScenarioParameters {
    /// Rejects any setting that would let a lever increase emissions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_range(
            "pop_growth_pct",
            self.pop_growth_pct,
            MIN_POP_GROWTH_PCT,
            MAX_POP_GROWTH_PCT,
        )?;
        ensure_range(
            "remote_days_per_week",
            self.remote_days_per_week,
            0.0,
            WORK_DAYS_PER_WEEK,
        )?;
        ensure_range(
            "carpool_occupancy",
            self.carpool_occupancy,
            1.0,
            MAX_CARPOOL_OCCUPANCY,
        )?;
        ensure_non_negative("it_extra_years", self.it_extra_years)?;

        for (field, value) in [
            ("mobility_sobriety_pct", self.mobility_sobriety_pct),
            ("heat_sobriety_pct", self.heat_sobriety_pct),
            ("solar_pct", self.solar_pct),
            ("refurbished_pct", self.refurbished_pct),
            ("vegetarian_pct", self.vegetarian_pct),
            ("waste_reduction_pct", self.waste_reduction_pct),
        ] {
            ensure_range(field, value, 0.0, 100.0)?;
        }

        Ok(())
    }

    pub fn population_coefficient(&self) -> f64 {
        1.0 + self.pop_growth_pct / 100.0
    }

    pub(crate) fn is_active(&self, lever: Lever) -> bool {
        match lever {
            Lever::RemoteWork => self.remote_days_per_week > 0.0,
            Lever::MobilitySobriety => self.mobility_sobriety_pct > 0.0,
            Lever::RailShift => self.rail_shift,
            Lever::Carpooling => self.carpool_occupancy > 1.0,
            Lever::SoftMobility => self.soft_mobility,
            Lever::HeatSobriety => self.heat_sobriety_pct > 0.0,
            Lever::LedRelamping => self.led_relamping,
            Lever::SolarSelfConsumption => self.solar_pct > 0.0,
            Lever::GreenElectricity => self.green_electricity,
            Lever::LifespanExtension => self.it_extra_years > 0.0,
            Lever::RefurbishedMix => self.refurbished_pct > 0.0,
            Lever::VegetarianMenus => self.vegetarian_pct > 0.0,
            Lever::WasteReduction => self.waste_reduction_pct > 0.0,
        }
    }

    pub(crate) fn configuration(&self, lever: Lever) -> String {
        match lever {
            Lever::RemoteWork => format!("{} day(s)/week", self.remote_days_per_week),
            Lever::MobilitySobriety => format!("-{}%", self.mobility_sobriety_pct),
            Lever::RailShift => toggle_label(self.rail_shift),
            Lever::Carpooling => format!("x{}", self.carpool_occupancy),
            Lever::SoftMobility => toggle_label(self.soft_mobility),
            Lever::HeatSobriety => format!("-{}%", self.heat_sobriety_pct),
            Lever::LedRelamping => toggle_label(self.led_relamping),
            Lever::SolarSelfConsumption => format!("{}% of demand", self.solar_pct),
            Lever::GreenElectricity => toggle_label(self.green_electricity),
            Lever::LifespanExtension => format!("+{} year(s)", self.it_extra_years),
            Lever::RefurbishedMix => format!("{}%", self.refurbished_pct),
            Lever::VegetarianMenus => format!("{}% of meals", self.vegetarian_pct),
            Lever::WasteReduction => format!("-{}%", self.waste_reduction_pct),
        }
    }
}

fn toggle_label(enabled: bool) -> String {
    if enabled { "enabled" } else { "disabled" }.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    RemoteWork,
    MobilitySobriety,
    RailShift,
    Carpooling,
    SoftMobility,
    HeatSobriety,
    LedRelamping,
    SolarSelfConsumption,
    GreenElectricity,
    LifespanExtension,
    RefurbishedMix,
    VegetarianMenus,
    WasteReduction,
}

impl Lever {
    /// Levers of a domain, in application order.
    pub const fn chain(domain: ImpactDomain) -> &'static [Lever] {
        match domain {
            ImpactDomain::Mobility => &[
                Lever::RemoteWork,
                Lever::MobilitySobriety,
                Lever::RailShift,
                Lever::Carpooling,
                Lever::SoftMobility,
            ],
            ImpactDomain::EnergyHeat => &[Lever::HeatSobriety],
            ImpactDomain::EnergyElectric => &[
                Lever::LedRelamping,
                Lever::SolarSelfConsumption,
                Lever::GreenElectricity,
            ],
            ImpactDomain::Digital => &[Lever::LifespanExtension, Lever::RefurbishedMix],
            ImpactDomain::Food => &[Lever::VegetarianMenus],
            ImpactDomain::WastePurchases => &[Lever::WasteReduction],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RemoteWork => "Remote work",
            Self::MobilitySobriety => "Travel sobriety",
            Self::RailShift => "Modal shift (air to rail)",
            Self::Carpooling => "Carpooling",
            Self::SoftMobility => "Cycling & soft mobility",
            Self::HeatSobriety => "Insulation & heating sobriety",
            Self::LedRelamping => "LED relamping",
            Self::SolarSelfConsumption => "Solar self-consumption",
            Self::GreenElectricity => "Green electricity contract",
            Self::LifespanExtension => "IT lifespan extension",
            Self::RefurbishedMix => "Refurbished equipment",
            Self::VegetarianMenus => "Vegetarian menus",
            Self::WasteReduction => "Waste reduction",
        }
    }

    fn apply(self, value: f64, params: &ScenarioParameters) -> f64 {
        match self {
            Self::RemoteWork => {
                let ratio_presence =
                    (WORK_DAYS_PER_WEEK - params.remote_days_per_week) / WORK_DAYS_PER_WEEK;
                value * ratio_presence
            }
            Self::MobilitySobriety => value * (1.0 - params.mobility_sobriety_pct / 100.0),
            Self::RailShift if params.rail_shift => {
                value - value * AIR_SHARE_OF_MOBILITY * RAIL_SHIFT_CUT
            }
            Self::Carpooling => value / params.carpool_occupancy,
            Self::SoftMobility if params.soft_mobility => value - value * SOFT_MOBILITY_SHARE,
            Self::HeatSobriety => value * (1.0 - params.heat_sobriety_pct / 100.0),
            Self::LedRelamping if params.led_relamping => value * LED_RESIDUAL,
            Self::SolarSelfConsumption => value * (1.0 - params.solar_pct / 100.0),
            Self::GreenElectricity if params.green_electricity => value * GREEN_CONTRACT_RESIDUAL,
            Self::LifespanExtension => {
                value / (1.0 + params.it_extra_years / IT_AMORTIZATION_YEARS)
            }
            Self::RefurbishedMix => {
                let refurbished = params.refurbished_pct / 100.0;
                value * ((1.0 - refurbished) * 1.0 + refurbished * REFURBISHED_RESIDUAL)
            }
            Self::VegetarianMenus => {
                let share = params.vegetarian_pct / 100.0;
                value * (1.0 - share) + value * share * VEGETARIAN_RESIDUAL
            }
            Self::WasteReduction => value * (1.0 - params.waste_reduction_pct / 100.0),
            Self::RailShift | Self::SoftMobility | Self::LedRelamping | Self::GreenElectricity => {
                value
            }
        }
    }
}

/// One lever application inside a domain chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverStep {
    pub lever: Lever,
    pub lever_label: &'static str,
    pub before_kgco2: f64,
    pub after_kgco2: f64,
}

/// Runs the domain's levers strictly in chain order, each consuming the previous output.
pub(crate) fn apply_chain(
    domain: ImpactDomain,
    projected_baseline: f64,
    params: &ScenarioParameters,
) -> (f64, Vec<LeverStep>) {
    let mut value = projected_baseline;
    let mut steps = Vec::with_capacity(Lever::chain(domain).len());

    for lever in Lever::chain(domain) {
        let after = lever.apply(value, params);
        steps.push(LeverStep {
            lever: *lever,
            lever_label: lever.label(),
            before_kgco2: value,
            after_kgco2: after,
        });
        value = after;
    }

    (value, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_levers_are_identity_for_every_domain() {
        let params = ScenarioParameters::default();
        for domain in ImpactDomain::ordered() {
            let (value, steps) = apply_chain(domain, 123.0, &params);
            assert_close(value, 123.0);
            assert!(steps.iter().all(|step| step.before_kgco2 == step.after_kgco2));
        }
    }

    #[test]
    fn mobility_chain_runs_in_documented_order() {
        let params = ScenarioParameters {
            remote_days_per_week: 1.0,
            mobility_sobriety_pct: 10.0,
            rail_shift: true,
            carpool_occupancy: 2.0,
            soft_mobility: true,
            ..ScenarioParameters::default()
        };
        let (value, steps) = apply_chain(ImpactDomain::Mobility, 1000.0, &params);

        let order: Vec<Lever> = steps.iter().map(|step| step.lever).collect();
        assert_eq!(order, Lever::chain(ImpactDomain::Mobility).to_vec());

        // 1000 * 0.8 = 800, * 0.9 = 720, - 720*0.27 = 525.6, / 2 = 262.8, * 0.85 = 223.38
        assert_close(steps[0].after_kgco2, 800.0);
        assert_close(steps[1].after_kgco2, 720.0);
        assert_close(steps[2].after_kgco2, 525.6);
        assert_close(steps[3].after_kgco2, 262.8);
        assert_close(value, 223.38);
    }

    #[test]
    fn electric_chain_compounds_led_solar_and_contract() {
        let params = ScenarioParameters {
            led_relamping: true,
            solar_pct: 20.0,
            green_electricity: true,
            ..ScenarioParameters::default()
        };
        let (value, _) = apply_chain(ImpactDomain::EnergyElectric, 100.0, &params);
        assert_close(value, 100.0 * 0.9 * 0.8 * 0.1);
    }

    #[test]
    fn digital_chain_amortizes_then_blends_refurbished() {
        let params = ScenarioParameters {
            it_extra_years: 4.0,
            refurbished_pct: 50.0,
            ..ScenarioParameters::default()
        };
        let (value, steps) = apply_chain(ImpactDomain::Digital, 400.0, &params);
        assert_close(steps[0].after_kgco2, 200.0);
        assert_close(value, 200.0 * 0.6);
    }

    #[test]
    fn food_and_single_step_domains() {
        let params = ScenarioParameters {
            vegetarian_pct: 40.0,
            heat_sobriety_pct: 25.0,
            waste_reduction_pct: 10.0,
            ..ScenarioParameters::default()
        };
        let (food, _) = apply_chain(ImpactDomain::Food, 100.0, &params);
        assert_close(food, 60.0 + 40.0 * 0.15);
        let (heat, _) = apply_chain(ImpactDomain::EnergyHeat, 100.0, &params);
        assert_close(heat, 75.0);
        let (waste, _) = apply_chain(ImpactDomain::WastePurchases, 100.0, &params);
        assert_close(waste, 90.0);
    }

    #[test]
    fn validate_rejects_levers_that_would_increase_emissions() {
        let carpool = ScenarioParameters {
            carpool_occupancy: 0.5,
            ..ScenarioParameters::default()
        };
        assert!(matches!(
            carpool.validate(),
            Err(ValidationError::OutOfRange {
                field: "carpool_occupancy",
                ..
            })
        ));

        let sobriety = ScenarioParameters {
            mobility_sobriety_pct: -10.0,
            ..ScenarioParameters::default()
        };
        assert!(sobriety.validate().is_err());

        let remote = ScenarioParameters {
            remote_days_per_week: 6.0,
            ..ScenarioParameters::default()
        };
        assert!(remote.validate().is_err());

        let years = ScenarioParameters {
            it_extra_years: f64::NAN,
            ..ScenarioParameters::default()
        };
        assert!(years.validate().is_err());

        assert!(ScenarioParameters::default().validate().is_ok());
    }
}
