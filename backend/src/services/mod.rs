//! Business logic services for the MedStock pharmacy server

pub mod alert;
pub mod forecasting;
pub mod inventory;
pub mod reorder_queue;
pub mod reporting;
pub mod sales;

pub use alert::AlertService;
pub use forecasting::ForecastingService;
pub use inventory::InventoryService;
pub use reorder_queue::ReorderQueueService;
pub use reporting::ReportingService;
pub use sales::SalesService;
