//! Route definitions for the MedStock pharmacy server

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/medicines", medicine_routes())
        .route("/bills", post(handlers::create_bill))
        .nest("/sales", sales_routes())
        .route("/forecasts/:medicine_id", get(handlers::get_forecast))
        .nest("/reorders", reorder_routes())
        .nest("/alerts", alert_routes())
        .route("/dashboard", get(handlers::dashboard))
}

/// Medicine catalogue and stock routes
fn medicine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_medicines).post(handlers::create_medicine))
        .route("/low-stock", get(handlers::low_stock))
        .route("/expiring", get(handlers::expiring))
        .route("/:medicine_id", get(handlers::get_medicine))
        .route("/:medicine_id/stock", post(handlers::receive_stock))
        .route("/:medicine_id/sales", get(handlers::get_daily_sales))
}

/// Sales history routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/trend", get(handlers::sales_trend))
        .route("/top", get(handlers::top_selling))
        .route("/:date", get(handlers::sales_on))
}

/// Reorder recommendation and queue routes
fn reorder_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(handlers::recommend_reorders))
        .route(
            "/queue",
            get(handlers::list_reorders).post(handlers::enqueue_reorder),
        )
        .route("/queue/low-stock", post(handlers::queue_low_stock))
        .route("/queue/:reorder_id/status", put(handlers::update_reorder_status))
}

/// Alert routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts).post(handlers::create_alert))
        .route("/emergency", get(handlers::emergency_report))
        .route("/:alert_id/resolve", post(handlers::resolve_alert))
}
