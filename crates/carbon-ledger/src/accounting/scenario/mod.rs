//! What-if projection over a ledger snapshot.
//!
//! The baseline is segmented into [`ImpactDomain`]s, scaled by the population coefficient, then
//! each domain runs its lever chain in a fixed order. Nothing here mutates the ledger.

mod levers;
mod segments;
pub mod views;

pub use levers::{
    Lever, LeverStep, ScenarioParameters, AIR_SHARE_OF_MOBILITY, GREEN_CONTRACT_RESIDUAL,
    IT_AMORTIZATION_YEARS, LED_RESIDUAL, MAX_CARPOOL_OCCUPANCY, RAIL_SHIFT_CUT,
    REFURBISHED_RESIDUAL, SOFT_MOBILITY_SHARE, VEGETARIAN_RESIDUAL, WORK_DAYS_PER_WEEK,
};
pub use segments::{keywords, segment, segment_text, ImpactDomain, SegmentedBaseline};

use super::domain::{floored_divisor, ValidationError};
use super::ledger::Ledger;
use super::settings::ProjectSettings;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainOutcome {
    pub domain: ImpactDomain,
    pub domain_label: &'static str,
    pub baseline_kgco2: f64,
    /// Baseline after demographic scaling; the anchor for gain attribution.
    pub projected_baseline_kgco2: f64,
    pub final_kgco2: f64,
    pub gain_kgco2: f64,
    pub steps: Vec<LeverStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub parameters: ScenarioParameters,
    pub population_coefficient: f64,
    pub domains: Vec<DomainOutcome>,
    pub unassigned_entries: usize,
    pub unassigned_baseline_kgco2: f64,
    pub unassigned_projected_kgco2: f64,
    pub total_ref_kgco2: f64,
    pub total_projected_baseline_kgco2: f64,
    pub total_final_kgco2: f64,
    pub total_gain_kgco2: f64,
    pub base_population: u32,
    pub projected_population: f64,
    pub ratio_final_t_per_capita: f64,
    pub budget_t_per_capita: f64,
    pub on_target: bool,
}

impl SimulationResult {
    pub fn domain(&self, domain: ImpactDomain) -> Option<&DomainOutcome> {
        self.domains.iter().find(|outcome| outcome.domain == domain)
    }
}

/// Projects the ledger under `params`. Lever settings that could raise emissions are rejected.
///
/// Unassigned entries follow the population coefficient but no lever, so with every lever off
/// and no growth `total_final_kgco2 == total_ref_kgco2`.
pub fn simulate(
    ledger: &Ledger,
    settings: &ProjectSettings,
    params: &ScenarioParameters,
) -> Result<SimulationResult, ValidationError> {
    params.validate()?;

    let baseline = SegmentedBaseline::from_ledger(ledger);
    let coefficient = params.population_coefficient();

    let domains: Vec<DomainOutcome> = ImpactDomain::ordered()
        .into_iter()
        .map(|domain| {
            let baseline_kgco2 = baseline.domain(domain);
            let projected = baseline_kgco2 * coefficient;
            let (final_kgco2, steps) = levers::apply_chain(domain, projected, params);
            DomainOutcome {
                domain,
                domain_label: domain.label(),
                baseline_kgco2,
                projected_baseline_kgco2: projected,
                final_kgco2,
                gain_kgco2: projected - final_kgco2,
                steps,
            }
        })
        .collect();

    let unassigned_projected = baseline.unassigned_kgco2 * coefficient;
    let total_projected_baseline = domains
        .iter()
        .map(|outcome| outcome.projected_baseline_kgco2)
        .sum::<f64>()
        + unassigned_projected;
    let total_final = domains
        .iter()
        .map(|outcome| outcome.final_kgco2)
        .sum::<f64>()
        + unassigned_projected;

    let base_population = settings.population.total();
    let projected_population = floored_divisor(f64::from(base_population) * coefficient);
    let ratio_final = (total_final / 1000.0) / projected_population;

    if baseline.unassigned_entries > 0 {
        debug!(
            entries = baseline.unassigned_entries,
            kgco2 = baseline.unassigned_kgco2,
            "entries outside every lever domain kept at projected baseline"
        );
    }

    Ok(SimulationResult {
        parameters: params.clone(),
        population_coefficient: coefficient,
        domains,
        unassigned_entries: baseline.unassigned_entries,
        unassigned_baseline_kgco2: baseline.unassigned_kgco2,
        unassigned_projected_kgco2: unassigned_projected,
        total_ref_kgco2: baseline.total_ref_kgco2,
        total_projected_baseline_kgco2: total_projected_baseline,
        total_final_kgco2: total_final,
        total_gain_kgco2: total_projected_baseline - total_final,
        base_population,
        projected_population,
        ratio_final_t_per_capita: ratio_final,
        budget_t_per_capita: settings.budget_t_per_capita,
        on_target: ratio_final <= settings.budget_t_per_capita,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::ledger::EntryDraft;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date")
    }

    fn ledger_of(rows: &[(&str, &str, f64, f64)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (category, item, quantity, factor) in rows {
            ledger
                .record(EntryDraft::new(*category, *item, *quantity, "u", *factor), day())
                .expect("valid entry");
        }
        ledger
    }

    #[test]
    fn population_growth_scales_before_levers() {
        let ledger = ledger_of(&[("Mobility", "Car trip", 100.0, 1.0)]);
        let params = ScenarioParameters {
            pop_growth_pct: 20.0,
            ..ScenarioParameters::default()
        };
        let result = simulate(&ledger, &ProjectSettings::default(), &params)
            .expect("valid parameters");
        let mobility = result.domain(ImpactDomain::Mobility).expect("mobility outcome");

        assert!((mobility.projected_baseline_kgco2 - 120.0).abs() < 1e-9);
        assert!((mobility.final_kgco2 - 120.0).abs() < 1e-9);
        assert!(mobility.gain_kgco2.abs() < 1e-9);
        assert!((result.projected_population - 27.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn unassigned_entries_only_follow_population() {
        let ledger = ledger_of(&[
            ("Events", "Gala venue", 50.0, 1.0),
            ("Waste", "Residual bin", 50.0, 1.0),
        ]);
        let params = ScenarioParameters {
            pop_growth_pct: 10.0,
            waste_reduction_pct: 100.0,
            ..ScenarioParameters::default()
        };
        let result = simulate(&ledger, &ProjectSettings::default(), &params)
            .expect("valid parameters");

        assert_eq!(result.unassigned_entries, 1);
        assert!((result.unassigned_projected_kgco2 - 55.0).abs() < 1e-9);
        assert!((result.total_final_kgco2 - 55.0).abs() < 1e-9);
        assert!((result.total_gain_kgco2 - 55.0).abs() < 1e-9);
    }

    #[test]
    fn per_capita_ratio_uses_tonnes_and_floors_population() {
        let ledger = ledger_of(&[("Mobility", "Car trip", 2000.0, 1.0)]);
        let mut settings = ProjectSettings::default();
        settings.population.students = 0;
        settings.population.apprentices = 0;
        settings.population.staff = 0;
        let result = simulate(&ledger, &settings, &ScenarioParameters::default())
            .expect("valid parameters");

        assert!((result.projected_population - 1.0).abs() < 1e-9);
        assert!((result.ratio_final_t_per_capita - 2.0).abs() < 1e-9);
        assert!(result.on_target);
    }

    #[test]
    fn invalid_parameters_are_rejected_before_any_work() {
        let params = ScenarioParameters {
            solar_pct: 120.0,
            ..ScenarioParameters::default()
        };
        assert!(matches!(
            simulate(&Ledger::new(), &ProjectSettings::default(), &params),
            Err(ValidationError::OutOfRange { field: "solar_pct", .. })
        ));
    }
}
