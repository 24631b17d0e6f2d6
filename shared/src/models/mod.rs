//! Domain models for the MedStock pharmacy platform

mod alert;
mod forecast;
mod medicine;
mod reorder;
mod sale;

pub use alert::*;
pub use forecast::*;
pub use medicine::*;
pub use reorder::*;
pub use sale::*;
