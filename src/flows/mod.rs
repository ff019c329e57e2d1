//! Flows module - Operations combining multiple stages
//!
//! Provides:
//! - metrics: character/token accounting and token-bounded splitting
//! - pack: the end-to-end packing pipeline

pub mod metrics;
pub mod pack;
