//! Database models for the MedStock pharmacy server
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
