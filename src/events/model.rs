//! Directory change events.
//!
//! Every variant owns its payload, so an event can be rendered, logged or
//! serialized long after the notification that produced it is gone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One change observed on the watched directory or something beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectoryChangeEvent {
    /// The watcher was pointed at a different directory.
    WatchedDirectoryChanged { path: PathBuf },

    /// The watched item itself was moved.
    PresentedItemMoved { new_path: PathBuf },

    /// Contents or attributes of the watched item changed.
    PresentedItemChanged { description: String },

    /// The watched item was deleted.
    PresentedItemDeleted { path: PathBuf },

    SubItemAdded { path: PathBuf },

    SubItemChanged { path: PathBuf },

    SubItemMoved { old_path: PathBuf, new_path: PathBuf },

    SubItemDeleted { path: PathBuf },

    /// Notification without a dedicated variant (coordination requests,
    /// version and ubiquity changes). `description` names the notification
    /// and whatever it carried.
    Unknown { description: String },
}

impl DirectoryChangeEvent {
    pub fn watched_directory_changed(path: impl Into<PathBuf>) -> Self {
        Self::WatchedDirectoryChanged { path: path.into() }
    }

    pub fn presented_item_moved(new_path: impl Into<PathBuf>) -> Self {
        Self::PresentedItemMoved {
            new_path: new_path.into(),
        }
    }

    pub fn presented_item_changed(description: impl Into<String>) -> Self {
        Self::PresentedItemChanged {
            description: description.into(),
        }
    }

    pub fn presented_item_deleted(path: impl Into<PathBuf>) -> Self {
        Self::PresentedItemDeleted { path: path.into() }
    }

    pub fn sub_item_added(path: impl Into<PathBuf>) -> Self {
        Self::SubItemAdded { path: path.into() }
    }

    pub fn sub_item_changed(path: impl Into<PathBuf>) -> Self {
        Self::SubItemChanged { path: path.into() }
    }

    pub fn sub_item_moved(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self::SubItemMoved {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }

    pub fn sub_item_deleted(path: impl Into<PathBuf>) -> Self {
        Self::SubItemDeleted { path: path.into() }
    }

    pub fn unknown(description: impl Into<String>) -> Self {
        Self::Unknown {
            description: description.into(),
        }
    }

    /// Short snake_case name of the variant, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WatchedDirectoryChanged { .. } => "watched_directory_changed",
            Self::PresentedItemMoved { .. } => "presented_item_moved",
            Self::PresentedItemChanged { .. } => "presented_item_changed",
            Self::PresentedItemDeleted { .. } => "presented_item_deleted",
            Self::SubItemAdded { .. } => "sub_item_added",
            Self::SubItemChanged { .. } => "sub_item_changed",
            Self::SubItemMoved { .. } => "sub_item_moved",
            Self::SubItemDeleted { .. } => "sub_item_deleted",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// The path this event is about, if it carries one. Moves report their
    /// destination.
    pub fn primary_path(&self) -> Option<&Path> {
        match self {
            Self::WatchedDirectoryChanged { path }
            | Self::PresentedItemDeleted { path }
            | Self::SubItemAdded { path }
            | Self::SubItemChanged { path }
            | Self::SubItemDeleted { path } => Some(path),
            Self::PresentedItemMoved { new_path } | Self::SubItemMoved { new_path, .. } => {
                Some(new_path)
            }
            Self::PresentedItemChanged { .. } | Self::Unknown { .. } => None,
        }
    }

    /// Human-readable one-line rendering containing every payload field.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DirectoryChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WatchedDirectoryChanged { path } => {
                write!(f, "watched directory changed to {}", path.display())
            }
            Self::PresentedItemMoved { new_path } => {
                write!(f, "presented item moved to {}", new_path.display())
            }
            Self::PresentedItemChanged { description } => {
                write!(f, "presented item changed: {}", description)
            }
            Self::PresentedItemDeleted { path } => {
                write!(f, "presented item deleted: {}", path.display())
            }
            Self::SubItemAdded { path } => write!(f, "subitem added: {}", path.display()),
            Self::SubItemChanged { path } => write!(f, "subitem changed: {}", path.display()),
            Self::SubItemMoved { old_path, new_path } => write!(
                f,
                "subitem moved: {} -> {}",
                old_path.display(),
                new_path.display()
            ),
            Self::SubItemDeleted { path } => write!(f, "subitem deleted: {}", path.display()),
            Self::Unknown { description } => write!(f, "unknown: {}", description),
        }
    }
}
