//! Notification translation - file-coordination callbacks → change events.
//!
//! Total mapping: every callback yields exactly one event, except subitem
//! change notices for filtered metadata files, which yield none.
//!
//! Translation rules:
//!   presented item moved / changed / disappeared → PresentedItem{Moved,Changed,Deleted}
//!   subitem appeared / moved / changed / disappeared → SubItem{Added,Moved,Changed,Deleted}
//!   relinquish, save, accommodate-deletion requests → Unknown(tag), continuation invoked
//!   version gained / lost / resolved, ubiquity changes → Unknown(tag with payload)

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::channel::EventChannel;
use crate::events::DirectoryChangeEvent;
use crate::presenter::{Completion, FilePresenter, FileVersion, Relinquish, SubitemFilter};
use crate::types::WatcherId;

/// Watched path shared between the adapter (reader) and the lifecycle
/// controller (only writer).
pub(crate) type SharedPath = Arc<RwLock<Option<PathBuf>>>;

/// [`FilePresenter`] implementation that feeds an [`EventChannel`].
///
/// This is the object handed to the coordinator on registration. It holds no
/// reference back to the watcher, so the coordinator keeping it alive never
/// keeps the watcher alive.
pub struct PresenterAdapter {
    watcher_id: WatcherId,
    channel: Arc<EventChannel>,
    watched_path: SharedPath,
    filter: Arc<dyn SubitemFilter>,
    trace_events: bool,
}

impl PresenterAdapter {
    pub(crate) fn new(
        watcher_id: WatcherId,
        channel: Arc<EventChannel>,
        watched_path: SharedPath,
        filter: Arc<dyn SubitemFilter>,
        trace_events: bool,
    ) -> Self {
        Self {
            watcher_id,
            channel,
            watched_path,
            filter,
            trace_events,
        }
    }

    fn emit(&self, event: DirectoryChangeEvent) {
        if self.trace_events {
            tracing::debug!(watcher = %self.watcher_id, kind = event.kind(), "{}", event);
        }
        self.channel.enqueue(event);
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.watched_path.read().clone()
    }

    /// Retarget notice. Only the lifecycle controller calls this, after it
    /// has moved the registration.
    pub(crate) fn watched_directory_did_change(&self, new_path: &Path) {
        self.emit(DirectoryChangeEvent::watched_directory_changed(new_path));
    }
}

fn join_attributes(attributes: &BTreeSet<String>) -> String {
    attributes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FilePresenter for PresenterAdapter {
    fn presented_item_path(&self) -> Option<PathBuf> {
        self.current_path()
    }

    // Requests: this adapter never needs exclusive access, so every request is
    // granted on the spot.

    fn relinquish_presented_item_to_reader(&self, reader: Relinquish) {
        self.emit(DirectoryChangeEvent::unknown("relinquishPresentedItem toReader"));
        reader(None);
    }

    fn relinquish_presented_item_to_writer(&self, writer: Relinquish) {
        self.emit(DirectoryChangeEvent::unknown("relinquishPresentedItem toWriter"));
        writer(None);
    }

    fn save_presented_item_changes(&self, completion: Completion) {
        self.emit(DirectoryChangeEvent::unknown("savePresentedItemChanges"));
        completion(Ok(()));
    }

    fn accommodate_presented_item_deletion(&self, completion: Completion) {
        self.emit(DirectoryChangeEvent::unknown("accommodatePresentedItemDeletion"));
        completion(Ok(()));
    }

    fn accommodate_presented_subitem_deletion(&self, path: &Path, completion: Completion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "accommodatePresentedSubitemDeletion at {}",
            path.display()
        )));
        completion(Ok(()));
    }

    fn presented_item_did_move(&self, new_path: &Path) {
        self.emit(DirectoryChangeEvent::presented_item_moved(new_path));
    }

    fn presented_item_did_change(&self) {
        let description = match self.current_path() {
            Some(path) => path.display().to_string(),
            None => "<no watched path>".to_string(),
        };
        self.emit(DirectoryChangeEvent::presented_item_changed(description));
    }

    fn presented_item_did_disappear(&self) {
        let event = match self.current_path() {
            Some(path) => DirectoryChangeEvent::presented_item_deleted(path),
            None => DirectoryChangeEvent::unknown("presentedItemDidDisappear <no watched path>"),
        };
        self.emit(event);
    }

    fn presented_item_did_change_ubiquity_attributes(&self, attributes: &BTreeSet<String>) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedItemDidChangeUbiquityAttributes [{}]",
            join_attributes(attributes)
        )));
    }

    fn presented_item_did_gain_version(&self, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedItemDidGainVersion {}",
            version
        )));
    }

    fn presented_item_did_lose_version(&self, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedItemDidLoseVersion {}",
            version
        )));
    }

    fn presented_item_did_resolve_conflict_version(&self, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedItemDidResolveConflictVersion {}",
            version
        )));
    }

    fn presented_subitem_did_appear(&self, path: &Path) {
        self.emit(DirectoryChangeEvent::sub_item_added(path));
    }

    fn presented_subitem_did_move(&self, old_path: &Path, new_path: &Path) {
        self.emit(DirectoryChangeEvent::sub_item_moved(old_path, new_path));
    }

    fn presented_subitem_did_change(&self, path: &Path) {
        if self.filter.is_ignored(path) {
            tracing::trace!(watcher = %self.watcher_id, "Ignored change to {}", path.display());
            return;
        }
        self.emit(DirectoryChangeEvent::sub_item_changed(path));
    }

    fn presented_subitem_did_disappear(&self, path: &Path) {
        self.emit(DirectoryChangeEvent::sub_item_deleted(path));
    }

    fn presented_subitem_did_gain_version(&self, path: &Path, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedSubitemAt {} didGainVersion {}",
            path.display(),
            version
        )));
    }

    fn presented_subitem_did_lose_version(&self, path: &Path, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedSubitemAt {} didLoseVersion {}",
            path.display(),
            version
        )));
    }

    fn presented_subitem_did_resolve_conflict_version(&self, path: &Path, version: &FileVersion) {
        self.emit(DirectoryChangeEvent::unknown(format!(
            "presentedSubitemAt {} didResolveConflictVersion {}",
            path.display(),
            version
        )));
    }
}

impl fmt::Debug for PresenterAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenterAdapter")
            .field("watcher_id", &self.watcher_id)
            .field("watched_path", &*self.watched_path.read())
            .field("trace_events", &self.trace_events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{IgnoredNames, Reacquire};
    use crate::types::CoordinationError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    fn adapter_at(path: Option<&str>) -> (PresenterAdapter, Arc<EventChannel>) {
        let channel = Arc::new(EventChannel::new());
        let adapter = PresenterAdapter::new(
            WatcherId::new(),
            channel.clone(),
            Arc::new(RwLock::new(path.map(PathBuf::from))),
            Arc::new(IgnoredNames::new([".DS_Store"])),
            true,
        );
        (adapter, channel)
    }

    fn drain(channel: &EventChannel) -> Vec<DirectoryChangeEvent> {
        std::iter::from_fn(|| channel.try_next()).collect()
    }

    fn counting_completion(
        counter: &Arc<AtomicUsize>,
        answers: &Arc<parking_lot::Mutex<Vec<Result<(), CoordinationError>>>>,
    ) -> Completion {
        let counter = counter.clone();
        let answers = answers.clone();
        Box::new(move |answer: Result<(), CoordinationError>| {
            counter.fetch_add(1, Ordering::SeqCst);
            answers.lock().push(answer);
        })
    }

    #[test]
    fn test_subitem_notices() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));

        adapter.presented_subitem_did_appear(Path::new("/tmp/watched/a.txt"));
        adapter.presented_subitem_did_change(Path::new("/tmp/watched/a.txt"));
        adapter.presented_subitem_did_move(
            Path::new("/tmp/watched/a.txt"),
            Path::new("/tmp/watched/b.txt"),
        );
        adapter.presented_subitem_did_disappear(Path::new("/tmp/watched/b.txt"));

        assert_eq!(
            drain(&channel),
            vec![
                DirectoryChangeEvent::sub_item_added("/tmp/watched/a.txt"),
                DirectoryChangeEvent::sub_item_changed("/tmp/watched/a.txt"),
                DirectoryChangeEvent::sub_item_moved("/tmp/watched/a.txt", "/tmp/watched/b.txt"),
                DirectoryChangeEvent::sub_item_deleted("/tmp/watched/b.txt"),
            ]
        );
    }

    #[traced_test]
    #[test]
    fn test_metadata_file_change_is_filtered() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));

        adapter.presented_subitem_did_change(Path::new("/tmp/watched/.DS_Store"));
        assert!(drain(&channel).is_empty());
        assert!(logs_contain("Ignored change to /tmp/watched/.DS_Store"));

        adapter.presented_subitem_did_change(Path::new("/tmp/watched/notes.md"));
        assert_eq!(
            drain(&channel),
            vec![DirectoryChangeEvent::sub_item_changed("/tmp/watched/notes.md")]
        );
    }

    #[test]
    fn test_filter_applies_only_to_change_notices() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));

        adapter.presented_subitem_did_appear(Path::new("/tmp/watched/.DS_Store"));
        adapter.presented_subitem_did_disappear(Path::new("/tmp/watched/.DS_Store"));

        assert_eq!(drain(&channel).len(), 2);
    }

    #[test]
    fn test_presented_item_notices() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));

        adapter.presented_item_did_move(Path::new("/tmp/elsewhere"));
        adapter.presented_item_did_change();
        adapter.presented_item_did_disappear();

        assert_eq!(
            drain(&channel),
            vec![
                DirectoryChangeEvent::presented_item_moved("/tmp/elsewhere"),
                DirectoryChangeEvent::presented_item_changed("/tmp/watched"),
                DirectoryChangeEvent::presented_item_deleted("/tmp/watched"),
            ]
        );
    }

    #[test]
    fn test_presented_item_notices_without_path() {
        let (adapter, channel) = adapter_at(None);
        assert_eq!(adapter.presented_item_path(), None);

        adapter.presented_item_did_change();
        adapter.presented_item_did_disappear();

        let events = drain(&channel);
        assert_eq!(
            events[0],
            DirectoryChangeEvent::presented_item_changed("<no watched path>")
        );
        assert!(matches!(events[1], DirectoryChangeEvent::Unknown { .. }));
    }

    #[test]
    fn test_relinquish_invokes_continuation_once() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        adapter.relinquish_presented_item_to_reader(Box::new(move |reacquire: Option<Reacquire>| {
            assert!(reacquire.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = calls.clone();
        adapter.relinquish_presented_item_to_writer(Box::new(move |_: Option<Reacquire>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            drain(&channel),
            vec![
                DirectoryChangeEvent::unknown("relinquishPresentedItem toReader"),
                DirectoryChangeEvent::unknown("relinquishPresentedItem toWriter"),
            ]
        );
    }

    #[test]
    fn test_requests_complete_without_error() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));
        let calls = Arc::new(AtomicUsize::new(0));
        let answers = Arc::new(parking_lot::Mutex::new(Vec::new()));

        adapter.save_presented_item_changes(counting_completion(&calls, &answers));
        adapter.accommodate_presented_item_deletion(counting_completion(&calls, &answers));
        adapter.accommodate_presented_subitem_deletion(
            Path::new("/tmp/watched/old.log"),
            counting_completion(&calls, &answers),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(answers.lock().iter().all(|answer| answer.is_ok()));
        assert_eq!(
            drain(&channel),
            vec![
                DirectoryChangeEvent::unknown("savePresentedItemChanges"),
                DirectoryChangeEvent::unknown("accommodatePresentedItemDeletion"),
                DirectoryChangeEvent::unknown(
                    "accommodatePresentedSubitemDeletion at /tmp/watched/old.log"
                ),
            ]
        );
    }

    #[test]
    fn test_continuations_run_after_close() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));
        channel.close();

        let calls = Arc::new(AtomicUsize::new(0));
        let answers = Arc::new(parking_lot::Mutex::new(Vec::new()));
        adapter.save_presented_item_changes(counting_completion(&calls, &answers));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(channel.stats().rejected_after_close, 1);
    }

    #[test]
    fn test_version_and_ubiquity_notices() {
        let (adapter, channel) = adapter_at(Some("/tmp/watched"));
        let version = FileVersion::new("v42");
        let sub = Path::new("/tmp/watched/doc.txt");

        adapter.presented_item_did_gain_version(&version);
        adapter.presented_item_did_lose_version(&version);
        adapter.presented_item_did_resolve_conflict_version(&version);
        adapter.presented_subitem_did_gain_version(sub, &version);
        adapter.presented_subitem_did_lose_version(sub, &version);
        adapter.presented_subitem_did_resolve_conflict_version(sub, &version);
        adapter.presented_item_did_change_ubiquity_attributes(&BTreeSet::from([
            "isDownloaded".to_string(),
            "isUploaded".to_string(),
        ]));

        let descriptions: Vec<String> = drain(&channel)
            .into_iter()
            .map(|event| match event {
                DirectoryChangeEvent::Unknown { description } => description,
                other => panic!("expected Unknown, got {:?}", other),
            })
            .collect();

        assert_eq!(
            descriptions,
            vec![
                "presentedItemDidGainVersion v42",
                "presentedItemDidLoseVersion v42",
                "presentedItemDidResolveConflictVersion v42",
                "presentedSubitemAt /tmp/watched/doc.txt didGainVersion v42",
                "presentedSubitemAt /tmp/watched/doc.txt didLoseVersion v42",
                "presentedSubitemAt /tmp/watched/doc.txt didResolveConflictVersion v42",
                "presentedItemDidChangeUbiquityAttributes [isDownloaded, isUploaded]",
            ]
        );
    }

    #[test]
    fn test_closure_filter() {
        let channel = Arc::new(EventChannel::new());
        let adapter = PresenterAdapter::new(
            WatcherId::new(),
            channel.clone(),
            Arc::new(RwLock::new(Some(PathBuf::from("/w")))),
            Arc::new(|path: &Path| path.extension().is_some_and(|ext| ext == "tmp")),
            false,
        );

        adapter.presented_subitem_did_change(Path::new("/w/build.tmp"));
        adapter.presented_subitem_did_change(Path::new("/w/.DS_Store"));

        assert_eq!(
            drain(&channel),
            vec![DirectoryChangeEvent::sub_item_changed("/w/.DS_Store")]
        );
    }
}
