use super::amount::Amount;
use super::state::{PaymentState, validate_transition};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded state change. `from` is `None` only for the creation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub from: Option<PaymentState>,
    pub to: PaymentState,
    pub action: String,
    pub detail: String,
}

/// A payment and its audit trail.
///
/// State only changes through [`Payment::transition_to`], which consults the
/// transition table, or [`Payment::mark_failed`]. The history is append-only
/// and purely informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: String,
    amount: Amount,
    currency: String,
    merchant_id: String,
    state: PaymentState,
    void_reason: Option<String>,
    history: Vec<HistoryEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: impl Into<String>,
        amount: Amount,
        currency: impl Into<String>,
        merchant_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let mut payment = Self {
            id: id.into(),
            amount,
            currency: currency.into(),
            merchant_id: merchant_id.into(),
            state: PaymentState::Initiated,
            void_reason: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        payment.record(None, PaymentState::Initiated, "CREATE", "Payment created");
        payment
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn void_reason(&self) -> Option<&str> {
        self.void_reason.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves to `target` if the table allows it. On error nothing is touched.
    pub fn transition_to(&mut self, target: PaymentState, action: &str, detail: &str) -> Result<()> {
        validate_transition(self.state, target)?;
        let from = self.state;
        self.state = target;
        self.updated_at = Utc::now();
        self.record(Some(from), target, action, detail);
        Ok(())
    }

    /// Forces the payment into FAILED whatever its current state.
    pub fn mark_failed(&mut self, reason: &str) {
        let from = self.state;
        self.state = PaymentState::Failed;
        self.updated_at = Utc::now();
        self.record(Some(from), PaymentState::Failed, "FAIL", reason);
    }

    pub fn set_void_reason(&mut self, reason: impl Into<String>) {
        self.void_reason = Some(reason.into());
        self.updated_at = Utc::now();
    }

    /// Compares the creation attributes only: id, amount, currency and
    /// merchant. State, history and timestamps are ignored.
    pub fn same_attributes(&self, other: &Payment) -> bool {
        self.id == other.id
            && self.amount == other.amount
            && self.currency == other.currency
            && self.merchant_id == other.merchant_id
    }

    fn record(&mut self, from: Option<PaymentState>, to: PaymentState, action: &str, detail: &str) {
        self.history.push(HistoryEntry {
            timestamp: Utc::now(),
            from,
            to,
            action: action.to_string(),
            detail: detail.to_string(),
        });
    }
}
