pub mod calendar;
pub mod domain;
pub mod factors;
pub mod kpi;
pub mod ledger;
pub(crate) mod normalizer;
pub mod scenario;
pub mod scope;
pub mod session;
pub mod settings;

pub use calendar::{operating_days_between, CalendarError};
pub use domain::{parse_number, Category, ValidationError};
pub use factors::{EmissionFactorSet, FactorError, GridMix};
pub use kpi::{compute_kpis, report_snapshot, KpiSet, ReportSnapshot, ScopeBreakdown};
pub use ledger::{record_entry, EntryDraft, Ledger, LedgerEntry};
pub use scenario::{simulate, ImpactDomain, ScenarioParameters, SimulationResult};
pub use scope::{classify_scope, Scope};
pub use session::CarbonSession;
pub use settings::{AmbitionLevel, Population, ProjectSettings};
