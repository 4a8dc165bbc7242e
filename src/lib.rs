//! customer-api - customer CRUD over a document store
//!
//! Layers, from the wire inwards:
//! - HTTP router and handlers (axum)
//! - Customer service with merge-on-update and simulated latency
//! - Customer repository storing one JSON document per customer
//! - Storage backends: in-memory, local filesystem, S3

pub mod api;
pub mod config;
pub mod error;
pub mod latency;
pub mod observability;
pub mod repository;
pub mod service;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
