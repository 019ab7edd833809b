//! Application layer containing the command-processing engine.
//!
//! `CommandProcessor` is the entry point: it receives a structured `Command`,
//! applies the payment lifecycle rules and persists through the repository
//! port.

pub mod command;
pub mod processor;
