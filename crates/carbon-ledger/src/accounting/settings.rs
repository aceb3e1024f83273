use super::domain::floored_divisor;
use super::factors::GridMix;
use serde::{Deserialize, Serialize};

pub mod keys {
    pub const ENTITY_NAME: &str = "entity_name";
    pub const POP_STUDENTS: &str = "pop_students";
    pub const POP_APPRENTICES: &str = "pop_apprentices";
    pub const POP_STAFF: &str = "pop_staff";
    pub const OPERATING_DAYS: &str = "operating_days";
    pub const BUDGET: &str = "budget_co2";
    pub const SHADOW_PRICE: &str = "shadow_price";
    pub const GRID: &str = "grid";

    pub const ALL: [&str; 8] = [
        ENTITY_NAME,
        POP_STUDENTS,
        POP_APPRENTICES,
        POP_STAFF,
        OPERATING_DAYS,
        BUDGET,
        SHADOW_PRICE,
        GRID,
    ];
}

pub const DEFAULT_OPERATING_DAYS: u32 = 160;
pub const DEFAULT_BUDGET_T_PER_CAPITA: f64 = 3.5;
pub const DEFAULT_SHADOW_PRICE: f64 = 100.0;

/// Head count split used for per-capita ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub students: u32,
    pub apprentices: u32,
    pub staff: u32,
}

impl Population {
    pub fn total(&self) -> u32 {
        self.students
            .saturating_add(self.apprentices)
            .saturating_add(self.staff)
    }

    /// Total head count floored at one person.
    pub fn divisor(&self) -> f64 {
        floored_divisor(self.total() as f64)
    }
}

impl Default for Population {
    fn default() -> Self {
        Self {
            students: 20,
            apprentices: 5,
            staff: 2,
        }
    }
}

/// Non-factor configuration of the assessed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub entity_name: String,
    pub population: Population,
    pub operating_days: u32,
    /// Target footprint in tonnes CO2e per person and year.
    pub budget_t_per_capita: f64,
    /// Notional price in euros per tonne CO2e.
    pub shadow_price: f64,
    pub grid: GridMix,
}

impl ProjectSettings {
    pub fn ambition(&self) -> AmbitionLevel {
        AmbitionLevel::for_budget(self.budget_t_per_capita)
    }

    pub fn operating_days_divisor(&self) -> f64 {
        floored_divisor(self.operating_days as f64)
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            entity_name: "Campus footprint".to_string(),
            population: Population::default(),
            operating_days: DEFAULT_OPERATING_DAYS,
            budget_t_per_capita: DEFAULT_BUDGET_T_PER_CAPITA,
            shadow_price: DEFAULT_SHADOW_PRICE,
            grid: GridMix::France,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbitionLevel {
    ParisAligned,
    GlobalTransition,
    NationalAverage,
    Critical,
}

impl AmbitionLevel {
    pub fn for_budget(budget_t_per_capita: f64) -> Self {
        if budget_t_per_capita <= 2.0 {
            Self::ParisAligned
        } else if budget_t_per_capita <= 5.0 {
            Self::GlobalTransition
        } else if budget_t_per_capita <= 9.0 {
            Self::NationalAverage
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ParisAligned => "2050 target (Paris Agreement)",
            Self::GlobalTransition => "Global transition",
            Self::NationalAverage => "National average",
            Self::Critical => "Critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_divisor_floors_empty_head_count() {
        let empty = Population {
            students: 0,
            apprentices: 0,
            staff: 0,
        };
        assert_eq!(empty.divisor(), 1.0);
        assert_eq!(Population::default().divisor(), 27.0);
    }

    #[test]
    fn ambition_levels_follow_budget_thresholds() {
        assert_eq!(AmbitionLevel::for_budget(2.0), AmbitionLevel::ParisAligned);
        assert_eq!(AmbitionLevel::for_budget(3.5), AmbitionLevel::GlobalTransition);
        assert_eq!(AmbitionLevel::for_budget(9.0), AmbitionLevel::NationalAverage);
        assert_eq!(AmbitionLevel::for_budget(12.0), AmbitionLevel::Critical);
    }
}
