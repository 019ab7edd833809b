//! Payment entities, the transition table and the storage port.

pub mod amount;
pub mod payment;
pub mod ports;
pub mod state;
