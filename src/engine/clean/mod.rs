pub mod executor;
pub mod lifecycle;
pub mod metadata;
pub mod plan;
pub mod planner;
pub mod policy;
pub mod runner;

pub use executor::CleanExecutor;
pub use lifecycle::CleanLifecycle;
pub use metadata::{CleanMetadata, PartitionCleanStats};
pub use plan::CleanPlan;
pub use planner::plan;
pub use policy::{RetentionPolicy, earliest_retained_commit};
pub use runner::CleanRunner;

#[cfg(test)]
mod runner_test;
