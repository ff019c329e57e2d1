//! repopack - pack a directory into a single LLM-friendly text file
//!
//! The pipeline runs discover → read → secret scan → transform → count →
//! render → write. See [`flows::pack::pack`] for the entry point.

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod flows;
pub mod security;
pub mod transform;

pub use crate::config::PackConfig;
pub use crate::core::model::PackResult;
pub use crate::core::util::Concurrency;
pub use crate::error::PackError;
pub use crate::flows::pack::pack;
