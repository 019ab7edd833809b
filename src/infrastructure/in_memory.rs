use crate::domain::payment::Payment;
use crate::domain::ports::PaymentRepository;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    payments: HashMap<String, Payment>,
    batch_ids: BTreeSet<String>,
}

/// A thread-safe in-memory payment repository.
///
/// Uses `Arc<RwLock<..>>` so any number of readers proceed together while a
/// write holds exclusive access. Clones share the same underlying data.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryPaymentRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: Payment) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.payments.insert(payment.id().to_string(), payment);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Payment> {
        let inner = self.inner.read().await;
        inner
            .payments
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found(id))
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner.payments.values().cloned().collect())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.payments.contains_key(id))
    }

    async fn record_batch_id(&self, batch_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.batch_ids.insert(batch_id.to_string());
        Ok(())
    }

    async fn batch_id_exists(&self, batch_id: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.batch_ids.contains(batch_id))
    }

    async fn batch_ids(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner.batch_ids.iter().cloned().collect())
    }
}
