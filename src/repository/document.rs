//! Document-per-customer repository on top of a storage backend

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

use crate::storage::StorageBackend;
use crate::types::Customer;
use crate::{Error, Result};

use super::{CustomerRepository, CustomerStream};

const COLLECTION: &str = "customers";
const DOCUMENT_SUFFIX: &str = ".json";

/// Stores each customer at `customers/<id>.json`
pub struct DocumentRepository {
    storage: Arc<dyn StorageBackend>,
}

impl DocumentRepository {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    fn collection_prefix() -> String {
        format!("{}/", COLLECTION)
    }

    fn document_key(id: &str) -> String {
        format!("{}/{}{}", COLLECTION, id, DOCUMENT_SUFFIX)
    }

    /// Ids become part of the storage key, so path separators are not allowed
    fn is_valid_id(id: &str) -> bool {
        !id.is_empty() && !id.contains(['/', '\\'])
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Load and decode one document, `None` if it is not there (anymore)
async fn load_document(storage: &dyn StorageBackend, key: &str) -> Result<Option<Customer>> {
    match storage.get(key).await? {
        Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl CustomerRepository for DocumentRepository {
    async fn find_all(&self) -> Result<CustomerStream> {
        let keys: Vec<String> = self
            .storage
            .list(&Self::collection_prefix())
            .await?
            .into_iter()
            .filter(|key| key.ends_with(DOCUMENT_SUFFIX))
            .collect();

        tracing::debug!(documents = keys.len(), "scanning customer collection");

        let storage = self.storage.clone();
        let customers = stream::iter(keys).filter_map(move |key| {
            let storage = storage.clone();
            // Documents deleted after the listing are skipped
            async move { load_document(storage.as_ref(), &key).await.transpose() }
        });

        Ok(customers.boxed())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }

        load_document(self.storage.as_ref(), &Self::document_key(id)).await
    }

    async fn save(&self, mut customer: Customer) -> Result<Customer> {
        let id = match customer.id() {
            Some(id) if Self::is_valid_id(id) => id.to_string(),
            Some(id) => {
                return Err(Error::invalid_request(format!(
                    "customer id must not contain path separators: {}",
                    id
                )))
            }
            None => Self::generate_id(),
        };
        customer.id = Some(id.clone());

        let data = serde_json::to_vec(&customer)?;
        self.storage
            .put(&Self::document_key(&id), Bytes::from(data))
            .await?;

        tracing::debug!(%id, "saved customer document");
        Ok(customer)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        if !Self::is_valid_id(id) {
            return Ok(());
        }

        self.storage.delete(&Self::document_key(id)).await?;
        tracing::debug!(%id, "deleted customer document");
        Ok(())
    }
}
