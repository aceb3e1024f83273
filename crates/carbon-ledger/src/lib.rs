//! Carbon accounting core: emission factors, the activity ledger, KPI aggregation, scope
//! classification, and the mitigation scenario simulator.
//!
//! Everything under [`accounting`] is pure with respect to the ledger it reads. Mutation only
//! happens through [`accounting::CarbonSession`], which the surrounding application owns.

pub mod accounting;
pub mod backup;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod telemetry;
