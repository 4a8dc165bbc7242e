//! HTTP API server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::CustomerService;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/customer", post(handlers::create))
        .route(
            "/customer/all",
            get(handlers::all)
                .put(handlers::update_id_all)
                .delete(handlers::delete_id_all),
        )
        .route(
            "/customer/:id",
            get(handlers::get_by_id)
                .put(handlers::update)
                .delete(handlers::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convenience helper when only the service is at hand
pub fn create_service_router(service: Arc<CustomerService>) -> Router {
    create_router(AppState::new(service))
}
