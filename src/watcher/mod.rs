//! Directory watcher - the consumer-facing handle.
//!
//! A [`DirectoryWatcher`] wires a [`PresenterAdapter`] to an [`EventChannel`],
//! registers the adapter with a [`FileCoordinator`], and hands out the event
//! stream. Dropping the watcher stops it through the same path as
//! [`DirectoryWatcher::stop`].

pub mod lifecycle;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::channel::{ChannelStats, EventChannel, EventStream};
use crate::events::{DirectoryChangeEvent, PresenterAdapter};
use crate::presenter::{FileCoordinator, IgnoredNames, SubitemFilter};
use crate::types::{RegistrationId, Result, WatcherConfig, WatcherId};

pub use lifecycle::{LifecycleController, LifecycleState};

/// Snapshot of a watcher's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherStats {
    pub state: LifecycleState,
    pub watched_path: Option<PathBuf>,
    pub channel: ChannelStats,
}

/// Builder for [`DirectoryWatcher`].
pub struct WatcherBuilder {
    coordinator: Arc<dyn FileCoordinator>,
    path: Option<PathBuf>,
    config: WatcherConfig,
    filter: Option<Arc<dyn SubitemFilter>>,
}

impl WatcherBuilder {
    fn new(coordinator: Arc<dyn FileCoordinator>) -> Self {
        Self {
            coordinator,
            path: None,
            config: WatcherConfig::default(),
            filter: None,
        }
    }

    /// Path to register at construction. Without one, nothing is registered
    /// until the first [`DirectoryWatcher::retarget`].
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the name-based filter built from the config.
    pub fn filter(mut self, filter: impl SubitemFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn build(self) -> Result<DirectoryWatcher> {
        self.config.validate()?;

        let id = WatcherId::new();
        let filter = self
            .filter
            .unwrap_or_else(|| Arc::new(IgnoredNames::from_config(&self.config)));
        let channel = Arc::new(EventChannel::new());
        let watched_path = Arc::new(RwLock::new(self.path));
        let adapter = Arc::new(PresenterAdapter::new(
            id.clone(),
            channel.clone(),
            watched_path.clone(),
            filter,
            self.config.trace_events,
        ));

        let lifecycle = LifecycleController::start(
            id.clone(),
            self.coordinator,
            adapter,
            channel.clone(),
            watched_path.clone(),
        )?;

        Ok(DirectoryWatcher {
            id,
            channel,
            watched_path,
            lifecycle,
        })
    }
}

impl fmt::Debug for WatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherBuilder")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("custom_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

/// Watches one directory and exposes its changes as an ordered event stream.
///
/// `DirectoryWatcher` is `Send + Sync`; share it behind an `Arc` to call
/// [`stop`](Self::stop) from several threads.
pub struct DirectoryWatcher {
    id: WatcherId,
    channel: Arc<EventChannel>,
    watched_path: Arc<RwLock<Option<PathBuf>>>,
    lifecycle: LifecycleController,
}

impl DirectoryWatcher {
    pub fn builder(coordinator: Arc<dyn FileCoordinator>) -> WatcherBuilder {
        WatcherBuilder::new(coordinator)
    }

    /// Watch `path` with the default configuration.
    pub fn new(coordinator: Arc<dyn FileCoordinator>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(coordinator).path(path).build()
    }

    pub fn id(&self) -> &WatcherId {
        &self.id
    }

    /// Lazy stream of events in arrival order.
    ///
    /// Streams share one queue: with several consumers each event goes to
    /// exactly one of them. The stream ends once the watcher is stopped and
    /// every buffered event has been taken.
    pub fn events(&self) -> EventStream {
        self.channel.consume()
    }

    /// Next buffered event, without waiting. `None` when nothing is buffered.
    pub fn try_next_event(&self) -> Option<DirectoryChangeEvent> {
        self.channel.try_next()
    }

    /// Stop watching. Idempotent and safe to call from any thread.
    ///
    /// Returns `true` for the call that actually stopped the watcher.
    pub fn stop(&self) -> bool {
        self.lifecycle.stop()
    }

    /// Move the watcher to another directory.
    pub fn retarget(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.lifecycle.retarget(&path.into())
    }

    pub fn watched_path(&self) -> Option<PathBuf> {
        self.watched_path.read().clone()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub(crate) fn registration(&self) -> Option<RegistrationId> {
        self.lifecycle.registration()
    }

    pub fn stats(&self) -> WatcherStats {
        WatcherStats {
            state: self.state(),
            watched_path: self.watched_path(),
            channel: self.channel.stats(),
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        if self.lifecycle.stop() {
            tracing::debug!(watcher = %self.id, "Watcher stopped on drop");
        }
    }
}

impl fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
