use super::levers::Lever;
use super::segments::ImpactDomain;
use super::SimulationResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallKind {
    Baseline,
    Adjustment,
    Gain,
    Projected,
}

/// One bar of the baseline-to-projection bridge, in tonnes CO2e.
///
/// Gains are negative deltas; baseline and projected bars are absolute levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallBar {
    pub label: String,
    pub kind: WaterfallKind,
    pub value_t: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlanRow {
    pub domain: ImpactDomain,
    pub domain_label: &'static str,
    pub lever: Lever,
    pub lever_label: &'static str,
    pub configuration: String,
    pub active: bool,
    pub status_label: &'static str,
}

impl SimulationResult {
    pub fn waterfall(&self) -> Vec<WaterfallBar> {
        let mut bars = Vec::with_capacity(self.domains.len() + 3);
        bars.push(WaterfallBar {
            label: "Current baseline".to_string(),
            kind: WaterfallKind::Baseline,
            value_t: self.total_ref_kgco2 / 1000.0,
        });
        bars.push(WaterfallBar {
            label: format!(
                "Population growth ({:+}%)",
                self.parameters.pop_growth_pct
            ),
            kind: WaterfallKind::Adjustment,
            value_t: (self.total_projected_baseline_kgco2 - self.total_ref_kgco2) / 1000.0,
        });
        for outcome in &self.domains {
            bars.push(WaterfallBar {
                label: format!("Gain {}", outcome.domain_label),
                kind: WaterfallKind::Gain,
                value_t: -outcome.gain_kgco2 / 1000.0,
            });
        }
        bars.push(WaterfallBar {
            label: "Projected footprint".to_string(),
            kind: WaterfallKind::Projected,
            value_t: self.total_final_kgco2 / 1000.0,
        });
        bars
    }

    /// Every lever, active or not, in domain and chain order.
    pub fn action_plan(&self) -> Vec<ActionPlanRow> {
        ImpactDomain::ordered()
            .into_iter()
            .flat_map(|domain| {
                Lever::chain(domain).iter().map(move |lever| (domain, *lever))
            })
            .map(|(domain, lever)| {
                let active = self.parameters.is_active(lever);
                ActionPlanRow {
                    domain,
                    domain_label: domain.label(),
                    lever,
                    lever_label: lever.label(),
                    configuration: self.parameters.configuration(lever),
                    active,
                    status_label: if active { "Active" } else { "Pending" },
                }
            })
            .collect()
    }
}
