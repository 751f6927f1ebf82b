mod aggregate;
mod checker;
mod checks;
mod context;
mod dispatch;
mod models;
mod probe;
mod registry;

pub use aggregate::Aggregator;
pub use checker::Checker;
pub use checks::HealthChecker;
pub use context::{CheckContext, ContextError};
pub use models::{
    ComponentReport, ComponentResult, ComponentStatus, OverallReport, OverallStatus, Presence,
};
pub use probe::RetryPolicy;
pub use registry::{Component, Registry, RegistryError};
