//! Report acquisition, normalization and the view-model derivations built on it

pub mod buckets;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod exposure;
pub mod log;
pub mod normalize;
pub mod report;
pub mod sort;
pub mod source;

// Re-export main types for cleaner imports
pub use dashboard::{Dashboard, DashboardState, FetchPolicy};
pub use error::{FetchFailure, ReportError, SchemaError};
pub use report::{RawPayload, Report};
pub use source::{ReportSource, ServiceStatus};
