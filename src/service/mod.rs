//! Customer service
//!
//! Sits between the HTTP handlers and the repository:
//! - passes repository results and failures through
//! - merges updates onto the stored identity
//! - delays results by a simulated processing latency and reports it

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::latency::{LatencySource, RandomLatency};
use crate::observability::{Observation, ObservationSink};
use crate::repository::{CustomerRepository, CustomerStream};
use crate::types::Customer;
use crate::{Error, Result};

/// Customer use cases
pub struct CustomerService {
    repository: Arc<dyn CustomerRepository>,
    latency: Arc<dyn LatencySource>,
    observer: Option<Arc<dyn ObservationSink>>,
}

impl CustomerService {
    /// Service with random latency and no observation sink
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self {
            repository,
            latency: Arc::new(RandomLatency::default()),
            observer: None,
        }
    }

    pub fn with_latency(mut self, latency: Arc<dyn LatencySource>) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ObservationSink>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// All customers, each one delayed by the same drawn latency
    pub async fn get_all(&self) -> Result<CustomerStream> {
        let delay = self.draw_delay("get_all.call");
        let customers = self.repository.find_all().await?;

        let delayed = customers.then(move |item| async move {
            if item.is_ok() {
                pause(delay).await;
            }
            item
        });

        Ok(delayed.boxed())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Customer>> {
        let delay = self.draw_delay("get_by_id.call");
        let customer = self.repository.find_by_id(id).await?;

        if customer.is_some() {
            pause(delay).await;
        }
        Ok(customer)
    }

    /// Persist a customer; a present id is the overwrite target
    pub async fn add(&self, customer: Customer) -> Result<Customer> {
        let delay = self.draw_delay("add.call");
        let saved = self.repository.save(customer).await?;

        pause(delay).await;
        Ok(saved)
    }

    /// Replace `name` and `age` of the customer stored at `id`.
    ///
    /// The read and the write are not atomic: a concurrent update of the same
    /// id between them is overwritten.
    pub async fn update(&self, id: &str, customer: Customer) -> Result<Customer> {
        let delay = self.draw_delay("update.call");

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;
        tracing::info!(%id, stored = ?existing, "update: loaded stored customer");

        let merged = existing.merged_with(&customer);
        tracing::info!(%id, changes = ?customer, "update: applying changes");

        let saved = self.add(merged).await?;

        pause(delay).await;
        Ok(saved)
    }

    /// Remove a customer; missing ids are fine
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repository.delete_by_id(id).await
    }

    fn draw_delay(&self, name: &'static str) -> Duration {
        let delay = self.latency.next_delay();
        self.observe(Observation::new(name, delay, self.latency.classify(delay)));
        delay
    }

    fn observe(&self, observation: Observation) {
        let Some(observer) = &self.observer else {
            return;
        };

        if let Err(e) = observer.record(&observation) {
            tracing::warn!(
                error = %e,
                operation = observation.name,
                "Failed to record observation; ignoring"
            );
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latency::{FixedLatency, LatencyClass, NoLatency};
    use crate::repository::DocumentRepository;
    use crate::storage::memory::MemoryStorage;
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Observation>>,
    }

    impl RecordingSink {
        fn names(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|o| o.name).collect()
        }
    }

    impl ObservationSink for RecordingSink {
        fn record(&self, observation: &Observation) -> Result<()> {
            self.events.lock().unwrap().push(observation.clone());
            Ok(())
        }
    }

    struct BrokenSink;

    impl ObservationSink for BrokenSink {
        fn record(&self, _observation: &Observation) -> Result<()> {
            Err(Error::internal("sink unavailable"))
        }
    }

    /// Repository whose store is unreachable
    struct UnreachableRepository;

    #[async_trait]
    impl CustomerRepository for UnreachableRepository {
        async fn find_all(&self) -> Result<CustomerStream> {
            Err(Error::storage("connection refused"))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Customer>> {
            Err(Error::storage("connection refused"))
        }

        async fn save(&self, _customer: Customer) -> Result<Customer> {
            Err(Error::storage("connection refused"))
        }

        async fn delete_by_id(&self, _id: &str) -> Result<()> {
            Err(Error::storage("connection refused"))
        }
    }

    fn service() -> CustomerService {
        let repository = Arc::new(DocumentRepository::new(Arc::new(MemoryStorage::new())));
        CustomerService::new(repository).with_latency(Arc::new(NoLatency))
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let service = service();

        let saved = service.add(Customer::new("One", 30)).await.unwrap();
        let id = saved.id().unwrap().to_string();

        assert_eq!(service.get_by_id(&id).await.unwrap(), Some(saved));
        assert_eq!(service.get_by_id("3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_merges_onto_existing_id() {
        let service = service();
        service
            .add(Customer::with_id("1", "One", 30))
            .await
            .unwrap();

        let updated = service
            .update("1", Customer::new("One-Update", 35))
            .await
            .unwrap();
        assert_eq!(updated, Customer::with_id("1", "One-Update", 35));

        // A body id never moves the record
        let updated = service
            .update("1", Customer::with_id("2", "One-Again", 36))
            .await
            .unwrap();
        assert_eq!(updated.id(), Some("1"));
        assert_eq!(service.get_by_id("2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = service();

        let result = service.update("3", Customer::new("One-Update", 35)).await;
        assert!(matches!(result, Err(Error::NotFound(id)) if id == "3"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let saved = service.add(Customer::new("One", 30)).await.unwrap();
        let id = saved.id().unwrap().to_string();

        service.delete(&id).await.unwrap();
        service.delete(&id).await.unwrap();
        service.delete("never-existed").await.unwrap();
        assert_eq!(service.get_by_id(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all() {
        let service = service();
        service.add(Customer::with_id("1", "One", 30)).await.unwrap();
        service.add(Customer::with_id("2", "Two", 35)).await.unwrap();

        let mut all: Vec<Customer> = service
            .get_all()
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        all.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(
            all,
            vec![
                Customer::with_id("1", "One", 30),
                Customer::with_id("2", "Two", 35),
            ]
        );
    }

    #[tokio::test]
    async fn test_observations_are_tagged() {
        let sink = Arc::new(RecordingSink::default());
        let repository = Arc::new(DocumentRepository::new(Arc::new(MemoryStorage::new())));
        let service = CustomerService::new(repository)
            .with_latency(Arc::new(FixedLatency(Duration::from_millis(300))))
            .with_observer(sink.clone());

        tokio::time::pause();
        let saved = service.add(Customer::new("One", 30)).await.unwrap();
        service
            .update(saved.id().unwrap(), Customer::new("One-Update", 31))
            .await
            .unwrap();
        let _ = service.get_all().await.unwrap();

        assert_eq!(
            sink.names(),
            vec!["add.call", "update.call", "add.call", "get_all.call"]
        );
        assert!(sink
            .events
            .lock()
            .unwrap()
            .iter()
            .all(|o| o.latency == LatencyClass::High && o.delay_ms == 300));
    }

    #[tokio::test]
    async fn test_broken_sink_does_not_affect_results() {
        let repository = Arc::new(DocumentRepository::new(Arc::new(MemoryStorage::new())));
        let service = CustomerService::new(repository)
            .with_latency(Arc::new(NoLatency))
            .with_observer(Arc::new(BrokenSink));

        let saved = service.add(Customer::new("One", 30)).await.unwrap();
        let id = saved.id().unwrap().to_string();
        assert_eq!(service.get_by_id(&id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_delay_is_applied() {
        let repository = Arc::new(DocumentRepository::new(Arc::new(MemoryStorage::new())));
        let service = CustomerService::new(repository)
            .with_latency(Arc::new(FixedLatency(Duration::from_millis(200))));

        tokio::time::pause();
        let start = tokio::time::Instant::now();
        let saved = service.add(Customer::new("One", 30)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));

        // update = its own delay + the delay of the nested add
        let start = tokio::time::Instant::now();
        service
            .update(saved.id().unwrap(), Customer::new("One", 31))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_get_all_delays_every_element() {
        let repository = Arc::new(DocumentRepository::new(Arc::new(MemoryStorage::new())));
        repository
            .save(Customer::with_id("1", "One", 30))
            .await
            .unwrap();
        repository
            .save(Customer::with_id("2", "Two", 35))
            .await
            .unwrap();
        let service = CustomerService::new(repository)
            .with_latency(Arc::new(FixedLatency(Duration::from_millis(200))));

        tokio::time::pause();
        let start = tokio::time::Instant::now();
        let all: Vec<Customer> = service
            .get_all()
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_store_failures_pass_through() {
        let service = CustomerService::new(Arc::new(UnreachableRepository))
            .with_latency(Arc::new(NoLatency));

        assert!(matches!(service.get_all().await, Err(Error::Storage(_))));
        assert!(matches!(service.get_by_id("1").await, Err(Error::Storage(_))));
        assert!(matches!(
            service.add(Customer::new("One", 30)).await,
            Err(Error::Storage(_))
        ));
        assert!(matches!(
            service.update("1", Customer::new("One", 30)).await,
            Err(Error::Storage(_))
        ));
        assert!(matches!(service.delete("1").await, Err(Error::Storage(_))));
    }
}
