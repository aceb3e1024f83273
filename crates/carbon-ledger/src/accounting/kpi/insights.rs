use super::super::ledger::Ledger;
use super::breakdown::category_breakdown;
use super::views::{Insight, InsightKind, KpiSet};
use std::cmp::Ordering;

/// Entries at or above this uncertainty are candidates for the priority insight.
pub const PRIORITY_UNCERTAINTY_PCT: u8 = 20;
pub const SCOPE3_DEPENDENCY_PCT: f64 = 50.0;
pub const LOW_DATA_QUALITY: f64 = 5.0;

fn insight(kind: InsightKind, message: String) -> Insight {
    Insight {
        kind,
        kind_label: kind.label(),
        message,
    }
}

pub fn generate_insights(ledger: &Ledger, kpis: &KpiSet) -> Vec<Insight> {
    let mut insights = Vec::new();
    if ledger.is_empty() || kpis.total_kgco2 <= 0.0 {
        return insights;
    }

    if let Some(dominant) = category_breakdown(ledger).first() {
        insights.push(insight(
            InsightKind::DominantCategory,
            format!(
                "{} is the main emission source ({:.0}% of the footprint)",
                dominant.category, dominant.share_pct
            ),
        ));
    }

    if kpis.scope3_share_pct > SCOPE3_DEPENDENCY_PCT {
        insights.push(insight(
            InsightKind::ScopeThreeDependency,
            format!(
                "{:.0}% of emissions sit in Scope 3; suppliers and travel drive the footprint",
                kpis.scope3_share_pct
            ),
        ));
    }

    if kpis.data_quality_index < LOW_DATA_QUALITY {
        insights.push(insight(
            InsightKind::DataQuality,
            format!(
                "Data quality index is {:.1}/10; replace estimates with measured values",
                kpis.data_quality_index
            ),
        ));
    }

    let priority = ledger
        .iter()
        .filter(|entry| entry.uncertainty_pct() >= PRIORITY_UNCERTAINTY_PCT)
        .max_by(|left, right| {
            left.impact_kgco2()
                .partial_cmp(&right.impact_kgco2())
                .unwrap_or(Ordering::Equal)
        });
    if let Some(entry) = priority {
        insights.push(insight(
            InsightKind::Priority,
            format!(
                "Refine '{}' first: {:.0} kgCO2e at {}% uncertainty",
                entry.item(),
                entry.impact_kgco2(),
                entry.uncertainty_pct()
            ),
        ));
    }

    let budget_message = if kpis.on_target {
        format!(
            "{:.2} t per person is within the {:.1} t budget",
            kpis.per_capita_t, kpis.budget_t_per_capita
        )
    } else {
        format!(
            "{:.2} t per person exceeds the {:.1} t budget by {:.2} t",
            kpis.per_capita_t, kpis.budget_t_per_capita, kpis.delta_to_budget_t
        )
    };
    insights.push(insight(InsightKind::Budget, budget_message));

    insights
}

#[cfg(test)]
mod tests {
    use super::super::compute_kpis;
    use super::*;
    use crate::accounting::ledger::EntryDraft;
    use crate::accounting::settings::ProjectSettings;
    use chrono::NaiveDate;

    #[test]
    fn empty_ledger_has_no_insights() {
        let ledger = Ledger::new();
        let kpis = compute_kpis(&ledger, &ProjectSettings::default());
        assert!(generate_insights(&ledger, &kpis).is_empty());
    }

    #[test]
    fn uncertain_large_entries_are_flagged_as_priority() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date");
        let mut ledger = Ledger::new();
        ledger
            .record(
                EntryDraft::new("Mobility", "Study trip flights", 8000.0, "km", 0.23)
                    .with_uncertainty(50),
                day,
            )
            .expect("valid entry");
        ledger
            .record(
                EntryDraft::new("Purchases", "Beef meal", 100.0, "meal", 7.0).with_uncertainty(5),
                day,
            )
            .expect("valid entry");

        let kpis = compute_kpis(&ledger, &ProjectSettings::default());
        let insights = generate_insights(&ledger, &kpis);
        let kinds: Vec<InsightKind> = insights.iter().map(|insight| insight.kind).collect();

        assert_eq!(kinds[0], InsightKind::DominantCategory);
        assert!(kinds.contains(&InsightKind::ScopeThreeDependency));
        assert!(kinds.contains(&InsightKind::DataQuality));
        let priority = insights
            .iter()
            .find(|insight| insight.kind == InsightKind::Priority)
            .expect("priority insight");
        assert!(priority.message.contains("Study trip flights"));
    }
}
