//! Watcher lifecycle management.
//!
//! Two states: ACTIVE → STOPPED. STOPPED is terminal.
//!
//! The controller is the only code that registers with or deregisters from
//! the coordinator, closes the event channel, or changes the watched path.
//! All of that happens under one mutex, so stop and retarget never interleave
//! and a stop runs its effects exactly once however many callers race it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::channel::EventChannel;
use crate::events::translation::SharedPath;
use crate::events::PresenterAdapter;
use crate::presenter::FileCoordinator;
use crate::types::{Error, RegistrationId, Result, WatcherId};

/// Lifecycle state of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Active,
    Stopped,
}

#[derive(Debug)]
struct Guarded {
    state: LifecycleState,
    registration: Option<RegistrationId>,
}

/// Owner of the ACTIVE/STOPPED flag and of the coordinator registration.
pub struct LifecycleController {
    watcher_id: WatcherId,
    guarded: Mutex<Guarded>,
    coordinator: Arc<dyn FileCoordinator>,
    adapter: Arc<PresenterAdapter>,
    channel: Arc<EventChannel>,
    watched_path: SharedPath,
}

impl LifecycleController {
    /// Build an ACTIVE controller, registering the current watched path (if
    /// any) before returning.
    pub(crate) fn start(
        watcher_id: WatcherId,
        coordinator: Arc<dyn FileCoordinator>,
        adapter: Arc<PresenterAdapter>,
        channel: Arc<EventChannel>,
        watched_path: SharedPath,
    ) -> Result<Self> {
        let initial_path = watched_path.read().clone();
        let registration = match &initial_path {
            Some(path) => {
                let id = coordinator.register(path, adapter.clone())?;
                tracing::info!(
                    watcher = %watcher_id,
                    registration = %id,
                    "Watching {}",
                    path.display()
                );
                Some(id)
            }
            None => {
                tracing::info!(watcher = %watcher_id, "Watcher started without a path");
                None
            }
        };

        Ok(Self {
            watcher_id,
            guarded: Mutex::new(Guarded {
                state: LifecycleState::Active,
                registration,
            }),
            coordinator,
            adapter,
            channel,
            watched_path,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.guarded.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Current coordinator registration, `None` when stopped or pathless.
    pub(crate) fn registration(&self) -> Option<RegistrationId> {
        self.guarded.lock().registration.clone()
    }

    /// Transition to STOPPED: close the channel and deregister.
    ///
    /// Returns `true` for the one call that performed the transition; every
    /// other call (concurrent or later) is a no-op returning `false`.
    pub fn stop(&self) -> bool {
        let mut guarded = self.guarded.lock();
        if guarded.state == LifecycleState::Stopped {
            return false;
        }
        guarded.state = LifecycleState::Stopped;

        self.channel.close();
        if let Some(registration) = guarded.registration.take() {
            self.coordinator.deregister(&registration);
        }

        tracing::info!(watcher = %self.watcher_id, "Watcher stopped");
        true
    }

    /// Point the watcher at `new_path`.
    ///
    /// Steps, in order: register `new_path`, swap the shared path, enqueue
    /// `WatchedDirectoryChanged`, then deregister the old registration. If the
    /// coordinator refuses the new path the watcher keeps its old path and
    /// registration. Notices still arriving on the old registration land after
    /// the retarget event and render the new path. A notice on the new
    /// registration that beats the path swap can still render the old one.
    pub fn retarget(&self, new_path: &Path) -> Result<()> {
        let mut guarded = self.guarded.lock();
        if guarded.state == LifecycleState::Stopped {
            return Err(Error::state_transition(format!(
                "cannot retarget watcher {} to {}: watcher is stopped",
                self.watcher_id,
                new_path.display()
            )));
        }

        let registration = self.coordinator.register(new_path, self.adapter.clone())?;
        let old_path: Option<PathBuf> = self.watched_path.write().replace(new_path.to_path_buf());
        self.adapter.watched_directory_did_change(new_path);

        if let Some(old) = guarded.registration.replace(registration.clone()) {
            self.coordinator.deregister(&old);
        }

        tracing::info!(
            watcher = %self.watcher_id,
            registration = %registration,
            "Retargeted {} -> {}",
            old_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            new_path.display()
        );
        Ok(())
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("watcher_id", &self.watcher_id)
            .field("guarded", &*self.guarded.lock())
            .finish_non_exhaustive()
    }
}
