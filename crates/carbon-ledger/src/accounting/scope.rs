//! GHG-protocol scope tagging.
//!
//! Rule cascade, first match wins:
//!
//! | Step | Text inspected            | Keywords                               | Result  |
//! |------|---------------------------|----------------------------------------|---------|
//! | 1    | detail                    | `scope 1`, `scope 2`, `scope 3`        | marker  |
//! | 2    | category                  | [`BUILDING_CATEGORY_KEYWORDS`] required for 3–4 |   |
//! | 3    | item + detail             | [`COMBUSTION_KEYWORDS`]                | Scope 1 |
//! | 4    | item + detail             | [`ELECTRICITY_KEYWORDS`]               | Scope 2 |
//! | 5    | anything else             |                                        | Scope 3 |
//!
//! Matching is a case-insensitive substring search. The result is never stored on the entry.

use super::ledger::{Ledger, LedgerEntry};
use super::normalizer::{contains_any, normalize_text};
use serde::{Deserialize, Serialize};

pub const SCOPE_MARKERS: [(&str, Scope); 3] = [
    ("scope 1", Scope::Scope1),
    ("scope 2", Scope::Scope2),
    ("scope 3", Scope::Scope3),
];

pub const BUILDING_CATEGORY_KEYWORDS: &[&str] = &["building", "energy", "bâtiment", "énergie"];

pub const COMBUSTION_KEYWORDS: &[&str] = &["gas", "fuel-oil", "fuel oil", "gaz", "fioul"];

pub const ELECTRICITY_KEYWORDS: &[&str] = &["elec", "heating", "heater", "élec", "chauffage"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[serde(rename = "scope_1")]
    Scope1,
    #[serde(rename = "scope_2")]
    Scope2,
    #[serde(rename = "scope_3")]
    Scope3,
}

impl Scope {
    pub const fn ordered() -> [Self; 3] {
        [Self::Scope1, Self::Scope2, Self::Scope3]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Scope1 => 1,
            Self::Scope2 => 2,
            Self::Scope3 => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scope1 => "Scope 1",
            Self::Scope2 => "Scope 2",
            Self::Scope3 => "Scope 3",
        }
    }
}

pub fn classify_scope(entry: &LedgerEntry) -> Scope {
    classify_text(entry.category(), entry.item(), entry.detail())
}

pub fn classify_text(category: &str, item: &str, detail: &str) -> Scope {
    let detail = normalize_text(detail);
    if let Some((_, scope)) = SCOPE_MARKERS
        .iter()
        .find(|(marker, _)| detail.contains(marker))
    {
        return *scope;
    }

    let category = normalize_text(category);
    if contains_any(&category, BUILDING_CATEGORY_KEYWORDS) {
        let text = format!("{} {}", normalize_text(item), detail);
        if contains_any(&text, COMBUSTION_KEYWORDS) {
            return Scope::Scope1;
        }
        if contains_any(&text, ELECTRICITY_KEYWORDS) {
            return Scope::Scope2;
        }
    }

    Scope::Scope3
}

/// Entries grouped by scope, preserving ledger order inside each group.
pub fn partition_by_scope(ledger: &Ledger) -> [(Scope, Vec<&LedgerEntry>); 3] {
    let mut groups = Scope::ordered().map(|scope| (scope, Vec::new()));
    for entry in ledger {
        let scope = classify_scope(entry);
        groups[(scope.number() - 1) as usize].1.push(entry);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_marker_wins_over_keywords() {
        assert_eq!(
            classify_text("Energy", "Gas boiler", "metered, Scope 2"),
            Scope::Scope2
        );
        assert_eq!(classify_text("Mobility", "Fleet van", "scope 1"), Scope::Scope1);
        assert_eq!(classify_text("Energy", "Elec", "Scope 3 upstream"), Scope::Scope3);
    }

    #[test]
    fn building_combustion_is_scope_one() {
        assert_eq!(classify_text("Building", "Heating (Gas)", "100 m²"), Scope::Scope1);
        assert_eq!(classify_text("Energy", "Boiler", "fuel-oil delivery"), Scope::Scope1);
        assert_eq!(classify_text("Bâtiment", "Chauffage (Gaz)", ""), Scope::Scope1);
    }

    #[test]
    fn building_electricity_is_scope_two() {
        assert_eq!(classify_text("Energy", "Electric heater", ""), Scope::Scope2);
        assert_eq!(
            classify_text("Building", "Heating (District network)", ""),
            Scope::Scope2
        );
        assert_eq!(classify_text("Énergie", "Conso Radiateur Élec", ""), Scope::Scope2);
    }

    #[test]
    fn everything_else_falls_back_to_scope_three() {
        assert_eq!(classify_text("Building", "Student chair", ""), Scope::Scope3);
        assert_eq!(classify_text("Mobility", "Gas car commute", ""), Scope::Scope3);
        assert_eq!(classify_text("Purchases", "Beef meal", ""), Scope::Scope3);
        assert_eq!(classify_text("", "", ""), Scope::Scope3);
    }

    #[test]
    fn classification_is_deterministic() {
        let first = classify_text("Energy", "Heating (Gas)", "");
        for _ in 0..5 {
            assert_eq!(classify_text("Energy", "Heating (Gas)", ""), first);
        }
    }
}
