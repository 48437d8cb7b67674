//! File-coordination contract.
//!
//! A [`FileCoordinator`] is the platform subsystem that knows about file
//! access on a path and notifies every registered [`FilePresenter`] about it.
//! The coordinator keeps a strong reference to each registered presenter and
//! calls it from its own threads until the registration is removed.
//!
//! Request-style callbacks carry a continuation ([`Completion`] or
//! [`Relinquish`]). The coordinator blocks other parties until it is invoked,
//! so a presenter must always call it exactly once.

pub mod filter;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::{CoordinationError, RegistrationId, Result};

pub use filter::{IgnoredNames, SubitemFilter};

/// Answer to a save or accommodate-deletion request.
pub type Completion = Box<dyn FnOnce(std::result::Result<(), CoordinationError>) + Send>;

/// Called by the coordinator once a coordinated read or write has finished,
/// handing access back to the presenter.
pub type Reacquire = Box<dyn FnOnce() + Send>;

/// Grant for a relinquish request. The presenter passes an optional
/// [`Reacquire`] to be run after the other party is done.
pub type Relinquish = Box<dyn FnOnce(Option<Reacquire>) + Send>;

/// A stored version of a file, as reported by version callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    /// Opaque identifier assigned by the version store.
    pub identifier: String,

    /// Modification timestamp as reported by the version store.
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl FileVersion {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            modified_at: None,
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.modified_at {
            Some(at) => write!(f, "{} ({})", self.identifier, at),
            None => write!(f, "{}", self.identifier),
        }
    }
}

/// Callback surface a coordinator invokes on a registered presenter.
///
/// Every method may be called from any thread, concurrently with any other.
/// Implementations must return promptly: some callbacks run inside the
/// coordinator's own wait.
pub trait FilePresenter: Send + Sync {
    /// Path the presenter currently observes.
    fn presented_item_path(&self) -> Option<PathBuf>;

    // -- Coordination requests ------------------------------------------------

    fn relinquish_presented_item_to_reader(&self, reader: Relinquish);

    fn relinquish_presented_item_to_writer(&self, writer: Relinquish);

    fn save_presented_item_changes(&self, completion: Completion);

    fn accommodate_presented_item_deletion(&self, completion: Completion);

    fn accommodate_presented_subitem_deletion(&self, path: &Path, completion: Completion);

    // -- Presented item notices -----------------------------------------------

    fn presented_item_did_move(&self, new_path: &Path);

    fn presented_item_did_change(&self);

    fn presented_item_did_disappear(&self);

    fn presented_item_did_change_ubiquity_attributes(&self, attributes: &BTreeSet<String>);

    fn presented_item_did_gain_version(&self, version: &FileVersion);

    fn presented_item_did_lose_version(&self, version: &FileVersion);

    fn presented_item_did_resolve_conflict_version(&self, version: &FileVersion);

    // -- Subitem notices ------------------------------------------------------

    fn presented_subitem_did_appear(&self, path: &Path);

    fn presented_subitem_did_move(&self, old_path: &Path, new_path: &Path);

    fn presented_subitem_did_change(&self, path: &Path);

    fn presented_subitem_did_disappear(&self, path: &Path);

    fn presented_subitem_did_gain_version(&self, path: &Path, version: &FileVersion);

    fn presented_subitem_did_lose_version(&self, path: &Path, version: &FileVersion);

    fn presented_subitem_did_resolve_conflict_version(&self, path: &Path, version: &FileVersion);
}

/// Registration side of the platform file-coordination subsystem.
#[cfg_attr(test, mockall::automock)]
pub trait FileCoordinator: Send + Sync {
    /// Start delivering notifications about `path` (and everything beneath
    /// it) to `presenter`.
    fn register(&self, path: &Path, presenter: Arc<dyn FilePresenter>) -> Result<RegistrationId>;

    /// Stop delivering notifications for a registration. Unknown ids are ignored.
    fn deregister(&self, registration: &RegistrationId);
}
