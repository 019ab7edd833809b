use super::command::{Command, CommandKind};
use crate::domain::amount::Amount;
use crate::domain::payment::Payment;
use crate::domain::ports::PaymentRepositoryBox;
use crate::domain::state::PaymentState;
use crate::error::{PaymentError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type PaymentLocks = StdMutex<HashMap<String, Arc<Mutex<()>>>>;

/// Applies structured commands to payments.
///
/// The processor owns every rule that mutates a payment: idempotent CREATE
/// and SETTLE, CREATE conflict resolution, and the optional pre-settlement
/// review gate. Storage goes through the repository port.
///
/// Commands touching the same payment id are serialized, so a host sharing
/// one processor between tasks sees per-payment changes in issue order.
pub struct CommandProcessor {
    repository: PaymentRepositoryBox,
    pre_settlement_threshold: Option<Amount>,
    payment_locks: PaymentLocks,
}

impl CommandProcessor {
    /// Creates a new `CommandProcessor`.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store for payments and settlement batch ids.
    /// * `pre_settlement_threshold` - Payments at or above this amount are
    ///   held in PRE_SETTLEMENT_REVIEW after authorization. `None` disables
    ///   the review.
    pub fn new(repository: PaymentRepositoryBox, pre_settlement_threshold: Option<Amount>) -> Self {
        Self {
            repository,
            pre_settlement_threshold,
            payment_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn pre_settlement_threshold(&self) -> Option<&Amount> {
        self.pre_settlement_threshold.as_ref()
    }

    /// Runs one command and returns the line to report.
    ///
    /// EXIT is accepted and yields an empty result; stopping the read loop is
    /// the caller's job.
    pub async fn execute(&self, command: &Command) -> Result<String> {
        let kind = CommandKind::from_name(&command.name)?;
        kind.check_args(command.args.len())?;

        match kind {
            CommandKind::Create => self.create(command).await,
            CommandKind::Authorize => self.authorize(&command.args[0]).await,
            CommandKind::Capture => self.capture(&command.args[0]).await,
            CommandKind::Void => self.void(&command.args[0], command.arg(1)).await,
            CommandKind::Refund => self.refund(&command.args[0], command.arg(1)).await,
            CommandKind::Settle => self.settle(&command.args[0]).await,
            CommandKind::Settlement => self.settlement(&command.args[0]).await,
            CommandKind::Status => self.status(&command.args[0]).await,
            CommandKind::List => self.list().await,
            CommandKind::Audit => self.audit(&command.args[0]).await,
            CommandKind::Exit => Ok(String::new()),
        }
    }

    /// All stored payments sorted by id.
    pub async fn payments(&self) -> Result<Vec<Payment>> {
        let mut payments = self.repository.list().await?;
        payments.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(payments)
    }

    async fn create(&self, command: &Command) -> Result<String> {
        let id = command.args[0].as_str();
        let amount_text = command.args[1].as_str();
        let currency = command.args[2].as_str();
        let merchant_id = command.args[3].as_str();

        if currency.chars().count() != 3 {
            return Err(PaymentError::validation(
                "currency",
                format!("must be a 3-letter code, got {currency}"),
            ));
        }
        if merchant_id.is_empty() {
            return Err(PaymentError::validation("merchant_id", "cannot be empty"));
        }
        let amount = Amount::parse(amount_text)?;

        let _guard = self.lock_payment(id).await;
        let candidate = Payment::new(id, amount, currency, merchant_id);

        if !self.repository.exists(id).await? {
            let amount = candidate.amount().to_string();
            self.repository.save(candidate).await?;
            tracing::info!(payment_id = id, amount = %amount, currency, "Payment created");
            return Ok(format!("Payment {id} created: {amount} {currency}"));
        }

        let mut existing = self.repository.get(id).await?;
        if existing.state() != PaymentState::Initiated {
            return Err(PaymentError::DuplicatePayment {
                id: id.to_string(),
                state: existing.state(),
            });
        }
        if existing.same_attributes(&candidate) {
            tracing::debug!(payment_id = id, "Duplicate CREATE ignored");
            return Ok(format!("Payment {id} already exists (idempotent)"));
        }

        existing.mark_failed("create conflict");
        self.repository.save(existing).await?;
        tracing::warn!(payment_id = id, "Conflicting CREATE, existing payment marked FAILED");
        Err(PaymentError::CreateConflict { id: id.to_string() })
    }

    async fn authorize(&self, id: &str) -> Result<String> {
        let _guard = self.lock_payment(id).await;
        let mut payment = self.repository.get(id).await?;

        payment.transition_to(PaymentState::Authorized, "AUTHORIZE", "Payment authorized")?;

        let review = self
            .pre_settlement_threshold
            .as_ref()
            .is_some_and(|threshold| payment.amount() >= threshold);
        if review {
            payment.transition_to(
                PaymentState::PreSettlementReview,
                "REVIEW",
                "Amount meets pre-settlement threshold",
            )?;
            self.persist(payment, PaymentState::Initiated).await?;
            return Ok(format!(
                "Payment {id} authorized and moved to PRE_SETTLEMENT_REVIEW"
            ));
        }

        self.persist(payment, PaymentState::Initiated).await?;
        Ok(format!("Payment {id} authorized"))
    }

    async fn capture(&self, id: &str) -> Result<String> {
        let _guard = self.lock_payment(id).await;
        let mut payment = self.repository.get(id).await?;
        let from = payment.state();

        payment.transition_to(PaymentState::Captured, "CAPTURE", "Payment captured")?;
        self.persist(payment, from).await?;
        Ok(format!("Payment {id} captured"))
    }

    async fn void(&self, id: &str, reason: Option<&str>) -> Result<String> {
        let reason = reason.filter(|r| !r.is_empty());
        let _guard = self.lock_payment(id).await;
        let mut payment = self.repository.get(id).await?;
        let from = payment.state();

        payment.transition_to(PaymentState::Voided, "VOID", "Payment voided")?;
        if let Some(reason) = reason {
            payment.set_void_reason(reason);
        }
        self.persist(payment, from).await?;

        Ok(match reason {
            Some(reason) => format!("Payment {id} voided (reason: {reason})"),
            None => format!("Payment {id} voided"),
        })
    }

    /// The optional amount is only echoed back: a refund always refunds the
    /// whole payment.
    async fn refund(&self, id: &str, amount: Option<&str>) -> Result<String> {
        let amount = amount.filter(|a| !a.is_empty());
        let _guard = self.lock_payment(id).await;
        let mut payment = self.repository.get(id).await?;
        let from = payment.state();

        payment.transition_to(PaymentState::Refunded, "REFUND", "Payment refunded")?;
        self.persist(payment, from).await?;

        Ok(match amount {
            Some(amount) => format!("Payment {id} refunded ({amount})"),
            None => format!("Payment {id} refunded"),
        })
    }

    async fn settle(&self, id: &str) -> Result<String> {
        let _guard = self.lock_payment(id).await;
        let mut payment = self.repository.get(id).await?;

        if payment.state() == PaymentState::Settled {
            tracing::debug!(payment_id = id, "Payment already settled");
            return Ok(format!("Payment {id} already settled (idempotent)"));
        }

        let from = payment.state();
        payment.transition_to(PaymentState::Settled, "SETTLE", "Payment settled")?;
        self.persist(payment, from).await?;
        Ok(format!("Payment {id} settled"))
    }

    async fn settlement(&self, batch_id: &str) -> Result<String> {
        if self.repository.batch_id_exists(batch_id).await? {
            tracing::debug!(batch_id, "Settlement batch reported again");
        }
        self.repository.record_batch_id(batch_id).await?;

        let settled = self
            .repository
            .list()
            .await?
            .iter()
            .filter(|p| p.state() == PaymentState::Settled)
            .count();

        tracing::info!(batch_id, settled, "Settlement batch recorded");
        Ok(format!(
            "SETTLEMENT {batch_id} recorded. Settled payments: {settled}"
        ))
    }

    async fn status(&self, id: &str) -> Result<String> {
        let payment = self.repository.get(id).await?;
        Ok(format!(
            "Payment {}: state={} amount={} currency={} merchant={}",
            payment.id(),
            payment.state(),
            payment.amount(),
            payment.currency(),
            payment.merchant_id()
        ))
    }

    async fn list(&self) -> Result<String> {
        let payments = self.payments().await?;
        if payments.is_empty() {
            return Ok("No payments found".to_string());
        }

        let mut out = String::from("Payments:");
        for p in &payments {
            out.push_str(&format!(
                "\n  {}: state={} amount={} {} merchant={}",
                p.id(),
                p.state(),
                p.amount(),
                p.currency(),
                p.merchant_id()
            ));
        }
        Ok(out)
    }

    async fn audit(&self, id: &str) -> Result<String> {
        if !self.repository.exists(id).await? {
            return Err(PaymentError::not_found(id));
        }
        Ok("AUDIT RECEIVED".to_string())
    }

    async fn persist(&self, payment: Payment, from: PaymentState) -> Result<()> {
        tracing::info!(
            payment_id = payment.id(),
            %from,
            to = %payment.state(),
            "Payment state changed"
        );
        self.repository.save(payment).await
    }

    /// Waits for exclusive access to `id`. The map entry lives only while
    /// some command holds or waits for it.
    async fn lock_payment(&self, id: &str) -> PaymentLock<'_> {
        let lock = {
            let mut locks = self.payment_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(id.to_string()).or_default().clone()
        };
        PaymentLock {
            locks: &self.payment_locks,
            id: id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.payment_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive hold on one payment id. Dropping it releases the id and
/// forgets the id's mutex once no other command is queued on it.
struct PaymentLock<'a> {
    locks: &'a PaymentLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PaymentLock<'_> {
    fn drop(&mut self) {
        // Release first so our own Arc no longer counts as a holder.
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
    }
}
