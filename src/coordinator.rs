//! In-process file coordinator.
//!
//! Keeps presenter registrations in memory and routes notifications to them.
//! A host that bridges a platform notification source (or a test standing in
//! for one) registers watchers here and calls [`InProcessCoordinator::dispatch`]
//! whenever something happens on disk. No polling happens here.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::presenter::{FileCoordinator, FilePresenter};
use crate::types::{Error, RegistrationId, Result};

struct Registration {
    path: PathBuf,
    presenter: Arc<dyn FilePresenter>,
}

/// Statistics about coordinator usage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorStats {
    pub active_registrations: usize,
    pub registrations: u64,
    pub deregistrations: u64,
}

/// Registry of presenters keyed by [`RegistrationId`].
pub struct InProcessCoordinator {
    registrations: RwLock<HashMap<RegistrationId, Registration>>,
    registered: AtomicU64,
    deregistered: AtomicU64,
}

impl InProcessCoordinator {
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            registered: AtomicU64::new(0),
            deregistered: AtomicU64::new(0),
        }
    }

    /// Presenters whose registered path is `path` or one of its ancestors.
    pub fn presenters_for(&self, path: &Path) -> Vec<Arc<dyn FilePresenter>> {
        self.registrations
            .read()
            .values()
            .filter(|registration| path.starts_with(&registration.path))
            .map(|registration| registration.presenter.clone())
            .collect()
    }

    /// Every registered presenter.
    pub fn presenters(&self) -> Vec<Arc<dyn FilePresenter>> {
        self.registrations
            .read()
            .values()
            .map(|registration| registration.presenter.clone())
            .collect()
    }

    /// Run `notify` on every presenter interested in `path`.
    ///
    /// The registry lock is released before any presenter is called, so a
    /// presenter may register or deregister from inside its callback.
    /// Returns the number of presenters notified.
    pub fn dispatch<F>(&self, path: &Path, notify: F) -> usize
    where
        F: Fn(&dyn FilePresenter),
    {
        let presenters = self.presenters_for(path);
        for presenter in &presenters {
            notify(presenter.as_ref());
        }
        presenters.len()
    }

    pub fn is_registered(&self, registration: &RegistrationId) -> bool {
        self.registrations.read().contains_key(registration)
    }

    /// Path recorded for a registration.
    pub fn registered_path(&self, registration: &RegistrationId) -> Option<PathBuf> {
        self.registrations
            .read()
            .get(registration)
            .map(|registration| registration.path.clone())
    }

    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            active_registrations: self.registrations.read().len(),
            registrations: self.registered.load(Ordering::Relaxed),
            deregistrations: self.deregistered.load(Ordering::Relaxed),
        }
    }
}

impl FileCoordinator for InProcessCoordinator {
    fn register(&self, path: &Path, presenter: Arc<dyn FilePresenter>) -> Result<RegistrationId> {
        if !path.is_absolute() {
            return Err(Error::registration(format!(
                "presented path must be absolute: {}",
                path.display()
            )));
        }

        let id = RegistrationId::new();
        self.registrations.write().insert(
            id.clone(),
            Registration {
                path: path.to_path_buf(),
                presenter,
            },
        );
        self.registered.fetch_add(1, Ordering::Relaxed);

        tracing::debug!("Registered presenter {} for {}", id, path.display());

        Ok(id)
    }

    fn deregister(&self, registration: &RegistrationId) {
        if self.registrations.write().remove(registration).is_some() {
            self.deregistered.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Deregistered presenter {}", registration);
        }
    }
}

impl Default for InProcessCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InProcessCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcessCoordinator")
            .field("stats", &self.stats())
            .finish()
    }
}
