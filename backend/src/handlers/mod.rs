//! HTTP handlers for the MedStock pharmacy server

mod alert;
mod forecast;
mod health;
mod inventory;
mod reorder;
mod reporting;
mod sales;

pub use alert::*;
pub use forecast::*;
pub use health::*;
pub use inventory::*;
pub use reorder::*;
pub use reporting::*;
pub use sales::*;
