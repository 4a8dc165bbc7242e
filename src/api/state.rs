//! API server state

use std::sync::Arc;

use crate::service::CustomerService;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Customer service shared by all requests
    pub service: Arc<CustomerService>,
}

impl AppState {
    pub fn new(service: Arc<CustomerService>) -> Self {
        Self { service }
    }
}
