use super::super::scope::Scope;
use super::super::settings::AmbitionLevel;
use serde::Serialize;

/// Indicator set for the dashboard. Masses in kgCO2e unless the field says tonnes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_kgco2: f64,
    pub total_margin_kgco2: f64,
    pub band_low_kgco2: f64,
    pub band_high_kgco2: f64,
    pub entry_count: usize,
    pub population: u32,
    pub per_capita_t: f64,
    pub budget_t_per_capita: f64,
    pub delta_to_budget_t: f64,
    pub on_target: bool,
    pub shadow_cost_eur: f64,
    pub daily_intensity_kg: f64,
    pub scope3_share_pct: f64,
    pub data_quality_index: f64,
    pub building_impact_kgco2: f64,
    pub ambition: AmbitionLevel,
    pub ambition_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub impact_kgco2: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoItem {
    pub item: String,
    pub impact_kgco2: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeShare {
    pub scope: Scope,
    pub scope_label: &'static str,
    pub entries: usize,
    pub impact_t: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeBreakdown {
    pub rows: Vec<ScopeShare>,
    pub total_t: f64,
}

impl ScopeBreakdown {
    pub fn get(&self, scope: Scope) -> Option<&ScopeShare> {
        self.rows.iter().find(|row| row.scope == scope)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEmitter {
    pub category: String,
    pub item: String,
    pub impact_kgco2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    DominantCategory,
    ScopeThreeDependency,
    DataQuality,
    Priority,
    Budget,
}

impl InsightKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DominantCategory => "Dominant category",
            Self::ScopeThreeDependency => "Value-chain dependency",
            Self::DataQuality => "Data quality",
            Self::Priority => "Priority",
            Self::Budget => "Carbon budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub kind_label: &'static str,
    pub message: String,
}

/// Read-only bundle handed to document and spreadsheet exporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub entity_name: String,
    pub kpis: KpiSet,
    pub scopes: ScopeBreakdown,
    pub categories: Vec<CategoryShare>,
    pub pareto: Vec<ParetoItem>,
    pub top_emitters: Vec<TopEmitter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<Insight>,
}
