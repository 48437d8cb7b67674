//! Core types for the directory watcher.
//!
//! This module provides foundational types used throughout the crate:
//! - **IDs**: Strongly-typed identifiers (WatcherId, RegistrationId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the watcher and observability

mod config;
mod errors;
mod ids;

pub use config::{Config, ObservabilityConfig, WatcherConfig};
pub use errors::{CoordinationError, Error, Result};
pub use ids::{RegistrationId, WatcherId};
