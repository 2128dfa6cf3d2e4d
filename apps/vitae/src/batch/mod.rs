// Batch planner: enumerates the cross-product, fans emissions out over
// blocking workers and collects one result per tuple.

pub mod plan;
pub mod report;
pub mod runner;
pub mod writer;

pub use plan::{plan, Emission, ViewKey};
pub use report::BatchReport;
pub use runner::{prepare_views, run};
