//! Customer repository
//!
//! The store adapter the service depends on. `DocumentRepository` keeps one
//! JSON document per customer in any [`StorageBackend`](crate::storage::StorageBackend).

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::types::Customer;
use crate::Result;

pub mod document;

pub use document::DocumentRepository;

/// Lazy, unordered sequence of customers
pub type CustomerStream = BoxStream<'static, Result<Customer>>;

/// CRUD capabilities over the customer collection
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Full collection scan, in no particular order
    async fn find_all(&self) -> Result<CustomerStream>;

    /// `None` when no customer has this id
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>>;

    /// Insert when the customer has no id (one is assigned), replace otherwise.
    /// Returns the persisted value.
    async fn save(&self, customer: Customer) -> Result<Customer>;

    /// Remove the customer if present
    async fn delete_by_id(&self, id: &str) -> Result<()>;
}
