//! Demand forecasting and reorder advisory engine
//!
//! Pure functions over a medicine snapshot and its daily sales. Reading the
//! data and choosing "today" are left to the caller.

pub mod model;
pub mod projector;
pub mod reorder;
pub mod seasonal;
pub mod trend;

pub use model::{CategoryDemand, ConfidenceDecay, ForecastModel, ReorderPolicy};
pub use projector::{project, project_from_category, project_from_trend, ForecastFault};
pub use reorder::rank;
pub use trend::{estimate_trend, TrendAverages, TrendEstimate};
