use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;

/// Storage consumed by the command processor.
///
/// Implementations own concurrency safety for their data; the processor
/// never mutates a payment except through `save`.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts or replaces the payment under its id.
    async fn save(&self, payment: Payment) -> Result<()>;
    /// Fails with `PaymentNotFound` when no payment has that id.
    async fn get(&self, id: &str) -> Result<Payment>;
    /// All payments, in no particular order.
    async fn list(&self) -> Result<Vec<Payment>>;
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn record_batch_id(&self, batch_id: &str) -> Result<()>;
    async fn batch_id_exists(&self, batch_id: &str) -> Result<bool>;
    /// Every recorded batch id, sorted.
    async fn batch_ids(&self) -> Result<Vec<String>>;
}

pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
