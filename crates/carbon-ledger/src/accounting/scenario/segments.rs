//! Baseline segmentation into the six lever domains.
//!
//! Rules are evaluated in this order and the first match wins, so every entry lands in at
//! most one domain:
//!
//! | Domain          | Text inspected    | Keywords                                  |
//! |-----------------|-------------------|-------------------------------------------|
//! | Mobility        | category, item    | [`keywords::MOBILITY`]                     |
//! | Energy-Electric | item, detail      | [`keywords::ELECTRIC`], Building/Energy only |
//! | Energy-Heat     |                   | any other Building/Energy entry            |
//! | Digital         | category          | [`keywords::DIGITAL`] or the word `it`     |
//! | Food            | item              | [`keywords::FOOD`]                         |
//! | Waste/Purchases | category          | [`keywords::WASTE_PURCHASES`]              |
//!
//! Entries matching nothing are reported as unassigned: they keep their weight in totals
//! but no lever touches them.

use super::super::ledger::{Ledger, LedgerEntry};
use super::super::normalizer::{contains_any, has_token, normalize_text};
use serde::{Deserialize, Serialize};

pub mod keywords {
    pub const MOBILITY: &[&str] = &[
        "mobility",
        "logistics",
        "transport",
        "commute",
        "car",
        "train",
        "plane",
        "tgv",
        "bus",
        "mobilité",
        "logistique",
    ];
    pub const ENERGY_CATEGORY: &[&str] = &["building", "energy", "bâtiment", "énergie"];
    pub const ELECTRIC: &[&str] = &[
        "elec", "watt", "kwh", "led", "lamp", "computer", "screen", "élec",
    ];
    pub const DIGITAL: &[&str] = &["digital", "computing", "numérique"];
    pub const DIGITAL_TOKENS: &[&str] = &["it"];
    pub const FOOD: &[&str] = &[
        "meal", "coffee", "drink", "snack", "catering", "repas", "café",
    ];
    pub const WASTE_PURCHASES: &[&str] = &["waste", "purchase", "supplies", "déchets", "achats"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDomain {
    Mobility,
    EnergyElectric,
    EnergyHeat,
    Digital,
    Food,
    WastePurchases,
}

impl ImpactDomain {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Mobility,
            Self::EnergyElectric,
            Self::EnergyHeat,
            Self::Digital,
            Self::Food,
            Self::WastePurchases,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mobility => "Mobility",
            Self::EnergyElectric => "Energy (electric)",
            Self::EnergyHeat => "Energy (heat)",
            Self::Digital => "Digital / IT",
            Self::Food => "Food",
            Self::WastePurchases => "Waste & purchases",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Mobility => 0,
            Self::EnergyElectric => 1,
            Self::EnergyHeat => 2,
            Self::Digital => 3,
            Self::Food => 4,
            Self::WastePurchases => 5,
        }
    }
}

pub fn segment(entry: &LedgerEntry) -> Option<ImpactDomain> {
    segment_text(entry.category(), entry.item(), entry.detail())
}

pub fn segment_text(category: &str, item: &str, detail: &str) -> Option<ImpactDomain> {
    let category = normalize_text(category);
    let item = normalize_text(item);
    let detail = normalize_text(detail);

    if contains_any(&category, keywords::MOBILITY) || contains_any(&item, keywords::MOBILITY) {
        return Some(ImpactDomain::Mobility);
    }

    if contains_any(&category, keywords::ENERGY_CATEGORY) {
        if contains_any(&item, keywords::ELECTRIC) || contains_any(&detail, keywords::ELECTRIC) {
            return Some(ImpactDomain::EnergyElectric);
        }
        return Some(ImpactDomain::EnergyHeat);
    }

    if contains_any(&category, keywords::DIGITAL) || has_token(&category, keywords::DIGITAL_TOKENS)
    {
        return Some(ImpactDomain::Digital);
    }

    if contains_any(&item, keywords::FOOD) {
        return Some(ImpactDomain::Food);
    }

    if contains_any(&category, keywords::WASTE_PURCHASES) {
        return Some(ImpactDomain::WastePurchases);
    }

    None
}

/// Baseline impact summed per domain, plus the unassigned remainder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentedBaseline {
    domains: [f64; 6],
    pub unassigned_kgco2: f64,
    pub unassigned_entries: usize,
    pub total_ref_kgco2: f64,
}

impl SegmentedBaseline {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let mut baseline = Self::default();
        for entry in ledger {
            let impact = entry.impact_kgco2();
            baseline.total_ref_kgco2 += impact;
            match segment(entry) {
                Some(domain) => baseline.domains[domain.index()] += impact,
                None => {
                    baseline.unassigned_kgco2 += impact;
                    baseline.unassigned_entries += 1;
                }
            }
        }
        baseline
    }

    pub fn domain(&self, domain: ImpactDomain) -> f64 {
        self.domains[domain.index()]
    }
}
