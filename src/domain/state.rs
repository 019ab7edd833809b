use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Initiated,
    Authorized,
    PreSettlementReview,
    Captured,
    Settled,
    Voided,
    Refunded,
    Failed,
}

/// Directly reachable targets for every state.
///
/// SETTLED loops onto itself so repeated settlement stays legal; the three
/// terminal states have no outgoing edges at all.
pub const TRANSITIONS: &[(PaymentState, &[PaymentState])] = &[
    (
        PaymentState::Initiated,
        &[
            PaymentState::Authorized,
            PaymentState::Voided,
            PaymentState::Failed,
        ],
    ),
    (
        PaymentState::Authorized,
        &[
            PaymentState::PreSettlementReview,
            PaymentState::Captured,
            PaymentState::Voided,
        ],
    ),
    (PaymentState::PreSettlementReview, &[PaymentState::Captured]),
    (
        PaymentState::Captured,
        &[PaymentState::Settled, PaymentState::Refunded],
    ),
    (PaymentState::Settled, &[PaymentState::Settled]),
    (PaymentState::Voided, &[]),
    (PaymentState::Refunded, &[]),
    (PaymentState::Failed, &[]),
];

impl PaymentState {
    pub const ALL: [PaymentState; 8] = [
        PaymentState::Initiated,
        PaymentState::Authorized,
        PaymentState::PreSettlementReview,
        PaymentState::Captured,
        PaymentState::Settled,
        PaymentState::Voided,
        PaymentState::Refunded,
        PaymentState::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Initiated => "INITIATED",
            PaymentState::Authorized => "AUTHORIZED",
            PaymentState::PreSettlementReview => "PRE_SETTLEMENT_REVIEW",
            PaymentState::Captured => "CAPTURED",
            PaymentState::Settled => "SETTLED",
            PaymentState::Voided => "VOIDED",
            PaymentState::Refunded => "REFUNDED",
            PaymentState::Failed => "FAILED",
        }
    }

    /// Targets reachable from `self`, empty when the state has no row.
    pub fn allowed_targets(&self) -> &'static [PaymentState] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// A state with no outgoing edges. SETTLED is not terminal because of
    /// its self-loop.
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        PaymentState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| PaymentError::validation("state", format!("unknown state {s}")))
    }
}

pub fn can_transition(from: PaymentState, to: PaymentState) -> bool {
    from.allowed_targets().contains(&to)
}

/// Same as [`can_transition`] for textual state names; any unknown name
/// yields `false`.
pub fn can_transition_by_name(from: &str, to: &str) -> bool {
    match (from.parse(), to.parse()) {
        (Ok(from), Ok(to)) => can_transition(from, to),
        _ => false,
    }
}

pub fn validate_transition(from: PaymentState, to: PaymentState) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(PaymentError::InvalidTransition { from, to })
    }
}
