mod breakdown;
mod insights;
pub mod views;

pub use breakdown::{category_breakdown, pareto, scope_breakdown, top_emitters};
pub use insights::{generate_insights, PRIORITY_UNCERTAINTY_PCT};
pub use views::{
    CategoryShare, Insight, InsightKind, KpiSet, ParetoItem, ReportSnapshot, ScopeBreakdown,
    ScopeShare, TopEmitter,
};

use super::ledger::{Ledger, LedgerEntry};
use super::normalizer::{contains_any, normalize_text};
use super::scope::{classify_scope, Scope, BUILDING_CATEGORY_KEYWORDS};
use super::settings::ProjectSettings;

pub const TOP_EMITTER_LIMIT: usize = 5;

/// Recomputes every indicator from the ledger snapshot. Pure and idempotent.
pub fn compute_kpis(ledger: &Ledger, settings: &ProjectSettings) -> KpiSet {
    let total = ledger.total_impact_kgco2();
    let margin: f64 = ledger.iter().map(LedgerEntry::margin_kgco2).sum();
    let scope3: f64 = ledger
        .iter()
        .filter(|entry| classify_scope(entry) == Scope::Scope3)
        .map(LedgerEntry::impact_kgco2)
        .sum();
    let building: f64 = ledger
        .iter()
        .filter(|entry| {
            contains_any(&normalize_text(entry.category()), BUILDING_CATEGORY_KEYWORDS)
        })
        .map(LedgerEntry::impact_kgco2)
        .sum();

    let per_capita_t = (total / 1000.0) / settings.population.divisor();
    let budget = settings.budget_t_per_capita;

    KpiSet {
        total_kgco2: total,
        total_margin_kgco2: margin,
        band_low_kgco2: (total - margin).max(0.0),
        band_high_kgco2: total + margin,
        entry_count: ledger.len(),
        population: settings.population.total(),
        per_capita_t,
        budget_t_per_capita: budget,
        delta_to_budget_t: per_capita_t - budget,
        on_target: per_capita_t <= budget,
        shadow_cost_eur: (total / 1000.0) * settings.shadow_price,
        daily_intensity_kg: total / settings.operating_days_divisor(),
        scope3_share_pct: share_pct(scope3, total),
        data_quality_index: data_quality_index(total, margin),
        building_impact_kgco2: building,
        ambition: settings.ambition(),
        ambition_label: settings.ambition().label(),
    }
}

/// `10 - (margin / impact) * 20`, clamped to `[0, 10]`; zero for an empty footprint.
pub fn data_quality_index(total_impact: f64, total_margin: f64) -> f64 {
    if total_impact > 0.0 {
        (10.0 - (total_margin / total_impact) * 20.0).clamp(0.0, 10.0)
    } else {
        0.0
    }
}

pub(crate) fn share_pct(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

pub fn report_snapshot(ledger: &Ledger, settings: &ProjectSettings) -> ReportSnapshot {
    let kpis = compute_kpis(ledger, settings);
    let insights = generate_insights(ledger, &kpis);
    ReportSnapshot {
        entity_name: settings.entity_name.clone(),
        scopes: scope_breakdown(ledger),
        categories: category_breakdown(ledger),
        pareto: pareto(ledger),
        top_emitters: top_emitters(ledger, TOP_EMITTER_LIMIT),
        insights,
        kpis,
    }
}
