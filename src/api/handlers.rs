//! API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde::Serialize;

use crate::api::AppState;
use crate::types::Customer;
use crate::Error;

type HandlerError = (StatusCode, String);

fn error_response(err: Error) -> HandlerError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, err.to_string())
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// List every customer
pub async fn all(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, HandlerError> {
    let customers: Vec<Customer> = state
        .service
        .get_all()
        .await
        .map_err(error_response)?
        .try_collect()
        .await
        .map_err(error_response)?;

    Ok(Json(customers))
}

/// Fetch one customer; an unknown id is an empty 200
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    let customer = state
        .service
        .get_by_id(&id)
        .await
        .map_err(error_response)?;

    Ok(match customer {
        Some(customer) => Json(customer).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

/// Insert a customer
pub async fn create(
    State(state): State<AppState>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, HandlerError> {
    let saved = state.service.add(customer).await.map_err(error_response)?;
    Ok(Json(saved))
}

/// Replace name and age of an existing customer
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, HandlerError> {
    update_customer(&state, &id, customer).await
}

/// Remove a customer, idempotent
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    delete_customer(&state, &id).await
}

/// `/customer/all` shadows `/customer/:id`, so the customer whose id is
/// literally `all` is updated and deleted through these.
pub async fn update_id_all(
    State(state): State<AppState>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, HandlerError> {
    update_customer(&state, ALL_ID, customer).await
}

pub async fn delete_id_all(State(state): State<AppState>) -> Result<StatusCode, HandlerError> {
    delete_customer(&state, ALL_ID).await
}

const ALL_ID: &str = "all";

async fn update_customer(
    state: &AppState,
    id: &str,
    customer: Customer,
) -> Result<Json<Customer>, HandlerError> {
    tracing::info!(%id, request = ?customer, "update requested");

    let saved = state
        .service
        .update(id, customer)
        .await
        .map_err(error_response)?;

    Ok(Json(saved))
}

async fn delete_customer(state: &AppState, id: &str) -> Result<StatusCode, HandlerError> {
    state.service.delete(id).await.map_err(error_response)?;
    Ok(StatusCode::OK)
}
