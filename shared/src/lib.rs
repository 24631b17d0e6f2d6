//! Shared types and the demand forecasting engine for the MedStock platform
//!
//! This crate contains the domain models, the reorder/forecast engine and
//! input validation shared between the backend and the browser (via WASM).

pub mod forecast;
pub mod models;
pub mod types;
pub mod validation;

pub use forecast::*;
pub use models::*;
pub use types::*;
pub use validation::*;
