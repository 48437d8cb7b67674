//! Subitem filtering.
//!
//! Some platforms rewrite hidden metadata files (directory-listing caches and
//! the like) whenever a directory is browsed. Change notices for those files
//! are dropped before they become events.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::types::WatcherConfig;

/// Predicate deciding whether a subitem-changed notice is suppressed.
pub trait SubitemFilter: Send + Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

impl<F> SubitemFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_ignored(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Ignores paths whose final component is one of a fixed set of names.
#[derive(Clone, Default)]
pub struct IgnoredNames {
    names: HashSet<OsString>,
}

impl IgnoredNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.ignored_file_names.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SubitemFilter for IgnoredNames {
    fn is_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.names.contains(name))
            .unwrap_or(false)
    }
}

impl fmt::Debug for IgnoredNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names.iter().collect();
        names.sort();
        f.debug_struct("IgnoredNames").field("names", &names).finish()
    }
}
