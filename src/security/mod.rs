//! Security module - Secret detection and exclusion
//!
//! Provides:
//! - rules: the built-in, extensible credential rule set
//! - scanner: bounded-concurrency scanning that yields ScanFindings in input order

pub mod rules;
pub mod scanner;
