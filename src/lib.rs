//! # Dirwatch - Directory-Change Observation Adapter
//!
//! Turns the many fine-grained callbacks of a file-coordination subsystem into
//! one ordered, typed stream of [`DirectoryChangeEvent`]s:
//! - Total callback → event translation, with configurable metadata-file filtering
//! - Unbounded, order-preserving, multi-producer event channel with close-then-drain
//! - Exactly-once stop (explicit or on drop), safe under concurrent callers
//! - Optional retargeting, serialized against stop
//!
//! ## Architecture
//!
//! ```text
//!   coordinator threads         ┌──────────────────┐        consumers
//!   ─── callbacks ───────────→  │ PresenterAdapter │
//!                               └────────┬─────────┘
//!                                        │ enqueue
//!                               ┌────────▼─────────┐
//!                               │   EventChannel   │ ──── events() ───→
//!                               └────────▲─────────┘
//!                                        │ close
//!                               ┌────────┴─────────┐
//!   stop() / retarget() / drop →│ LifecycleControl │ ── (de)register ─→ FileCoordinator
//!                               └──────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod channel;
pub mod coordinator;
pub mod events;
pub mod presenter;
pub mod types;
pub mod watcher;

// Internal utilities
pub mod observability;

pub use channel::{ChannelStats, EventChannel, EventStream};
pub use coordinator::{CoordinatorStats, InProcessCoordinator};
pub use events::{DirectoryChangeEvent, PresenterAdapter};
pub use presenter::{
    Completion, FileCoordinator, FilePresenter, FileVersion, IgnoredNames, Reacquire, Relinquish,
    SubitemFilter,
};
pub use types::{Config, CoordinationError, Error, Result, WatcherConfig};
pub use watcher::{DirectoryWatcher, LifecycleState, WatcherBuilder, WatcherStats};
