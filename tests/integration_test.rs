//! Integration tests for customer-api
//!
//! These tests drive the service against real storage backends.

use customer_api::latency::NoLatency;
use customer_api::repository::{CustomerRepository, DocumentRepository};
use customer_api::service::CustomerService;
use customer_api::storage::local::LocalStorage;
use customer_api::storage::memory::MemoryStorage;
use customer_api::types::Customer;
use customer_api::Error;
use futures::TryStreamExt;
use std::sync::Arc;
use tempfile::TempDir;

fn service_on(repository: Arc<dyn CustomerRepository>) -> CustomerService {
    CustomerService::new(repository).with_latency(Arc::new(NoLatency))
}

/// add → update → missing lookup → missing update
#[tokio::test]
async fn test_end_to_end_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(LocalStorage::new(temp_dir.path()).unwrap());
    let service = service_on(Arc::new(DocumentRepository::new(storage)));

    let created = service.add(Customer::new("Test", 30)).await.unwrap();
    let id = created.id().expect("store assigns an id").to_string();
    assert!(!id.is_empty());
    assert_eq!(created.name, "Test");
    assert_eq!(created.age, 30);

    let updated = service
        .update(&id, Customer::new("Test2", 31))
        .await
        .unwrap();
    assert_eq!(updated, Customer::with_id(id.clone(), "Test2", 31));

    assert_eq!(service.get_by_id("nonexistent-id").await.unwrap(), None);

    let missing = service
        .update("nonexistent-id", Customer::new("X", 1))
        .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_round_trip_and_delete() {
    let service = service_on(Arc::new(DocumentRepository::new(Arc::new(
        MemoryStorage::new(),
    ))));

    let created = service.add(Customer::new("Round", 42)).await.unwrap();
    let id = created.id().unwrap().to_string();
    assert_eq!(service.get_by_id(&id).await.unwrap(), Some(created));

    service.delete(&id).await.unwrap();
    assert_eq!(service.get_by_id(&id).await.unwrap(), None);

    // second delete observes the same success
    service.delete(&id).await.unwrap();
    assert_eq!(service.get_by_id(&id).await.unwrap(), None);
}

#[tokio::test]
async fn test_documents_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let created = {
        let storage = Arc::new(LocalStorage::new(temp_dir.path()).unwrap());
        let service = service_on(Arc::new(DocumentRepository::new(storage)));
        service.add(Customer::new("Durable", 50)).await.unwrap()
    };

    let storage = Arc::new(LocalStorage::new(temp_dir.path()).unwrap());
    let service = service_on(Arc::new(DocumentRepository::new(storage)));

    let all: Vec<Customer> = service
        .get_all()
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all, vec![created]);
}

#[tokio::test]
async fn test_concurrent_adds_get_distinct_ids() {
    let service = Arc::new(service_on(Arc::new(DocumentRepository::new(Arc::new(
        MemoryStorage::new(),
    )))));

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.add(Customer::new(format!("c{}", i), i)).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let customer = handle.await.unwrap().unwrap();
        ids.push(customer.id.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let all: Vec<Customer> = service
        .get_all()
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 20);
}
