use super::super::ledger::Ledger;
use super::super::scope::{partition_by_scope, Scope};
use super::share_pct;
use super::views::{CategoryShare, ParetoItem, ScopeBreakdown, ScopeShare, TopEmitter};
use std::cmp::Ordering;

/// Sums impact per key, keeping first-seen order so ties stay stable after sorting.
fn grouped<'a>(keys: impl Iterator<Item = (&'a str, f64)>) -> Vec<(&'a str, f64)> {
    let mut groups: Vec<(&str, f64)> = Vec::new();
    for (key, impact) in keys {
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, total)) => *total += impact,
            None => groups.push((key, impact)),
        }
    }
    groups.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    groups
}

/// Impact per category, largest first.
pub fn category_breakdown(ledger: &Ledger) -> Vec<CategoryShare> {
    let total = ledger.total_impact_kgco2();
    grouped(
        ledger
            .iter()
            .map(|entry| (entry.category(), entry.impact_kgco2())),
    )
    .into_iter()
    .map(|(category, impact)| CategoryShare {
        category: category.to_string(),
        impact_kgco2: impact,
        share_pct: share_pct(impact, total),
    })
    .collect()
}

/// Items sorted by impact with their running share of the total.
pub fn pareto(ledger: &Ledger) -> Vec<ParetoItem> {
    let total = ledger.total_impact_kgco2();
    let mut running = 0.0;
    grouped(ledger.iter().map(|entry| (entry.item(), entry.impact_kgco2())))
        .into_iter()
        .map(|(item, impact)| {
            running += impact;
            ParetoItem {
                item: item.to_string(),
                impact_kgco2: impact,
                cumulative_pct: share_pct(running, total),
            }
        })
        .collect()
}

/// Always three rows, Scope 1 to 3, even when a scope is empty.
pub fn scope_breakdown(ledger: &Ledger) -> ScopeBreakdown {
    let total = ledger.total_impact_kgco2();
    let rows = partition_by_scope(ledger)
        .into_iter()
        .map(|(scope, entries): (Scope, Vec<_>)| {
            let impact: f64 = entries.iter().map(|entry| entry.impact_kgco2()).sum();
            ScopeShare {
                scope,
                scope_label: scope.label(),
                entries: entries.len(),
                impact_t: impact / 1000.0,
                share_pct: share_pct(impact, total),
            }
        })
        .collect();

    ScopeBreakdown {
        rows,
        total_t: total / 1000.0,
    }
}

/// Largest category+item pairs.
pub fn top_emitters(ledger: &Ledger, limit: usize) -> Vec<TopEmitter> {
    let mut groups: Vec<(&str, &str, f64)> = Vec::new();
    for entry in ledger {
        match groups
            .iter_mut()
            .find(|(category, item, _)| *category == entry.category() && *item == entry.item())
        {
            Some((_, _, total)) => *total += entry.impact_kgco2(),
            None => groups.push((entry.category(), entry.item(), entry.impact_kgco2())),
        }
    }
    groups.sort_by(|left, right| right.2.partial_cmp(&left.2).unwrap_or(Ordering::Equal));
    groups
        .into_iter()
        .take(limit)
        .map(|(category, item, impact)| TopEmitter {
            category: category.to_string(),
            item: item.to_string(),
            impact_kgco2: impact,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::ledger::EntryDraft;
    use chrono::NaiveDate;

    fn ledger() -> Ledger {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date");
        let mut ledger = Ledger::new();
        for (category, item, impact) in [
            ("Purchases", "Beef meal", 70.0),
            ("Mobility", "Car trip", 190.0),
            ("Purchases", "Beef meal", 70.0),
            ("Purchases", "Coffee", 20.0),
        ] {
            ledger
                .record(EntryDraft::new(category, item, impact, "u", 1.0), day)
                .expect("valid entry");
        }
        ledger
    }

    #[test]
    fn categories_are_grouped_and_sorted_descending() {
        let categories = category_breakdown(&ledger());
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category, "Mobility");
        assert!((categories[1].impact_kgco2 - 160.0).abs() < 1e-9);
    }

    #[test]
    fn pareto_accumulates_to_one_hundred_percent() {
        let items = pareto(&ledger());
        assert_eq!(items[0].item, "Car trip");
        assert_eq!(items[1].item, "Beef meal");
        assert!((items[2].cumulative_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn scope_breakdown_keeps_empty_scopes() {
        let breakdown = scope_breakdown(&ledger());
        let scopes: Vec<Scope> = breakdown.rows.iter().map(|row| row.scope).collect();
        assert_eq!(scopes, Scope::ordered().to_vec());

        let scope1 = breakdown.get(Scope::Scope1).expect("scope 1 row");
        assert_eq!(scope1.entries, 0);
        assert_eq!(scope1.share_pct, 0.0);
        assert_eq!(breakdown.rows.iter().map(|row| row.entries).sum::<usize>(), 4);
    }

    #[test]
    fn top_emitters_respects_limit() {
        let top = top_emitters(&ledger(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].item, "Beef meal");
        assert!((top[1].impact_kgco2 - 140.0).abs() < 1e-9);
    }
}
