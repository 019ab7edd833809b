//! Line-oriented command input: parsing and the read loop.

pub mod command_parser;
pub mod runner;
