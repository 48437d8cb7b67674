//! Event infrastructure - the typed change-event model and the adapter that
//! produces it.
//!
//! File-coordination callbacks arrive at [`PresenterAdapter`], which turns each
//! one into exactly one [`DirectoryChangeEvent`] (or none, for filtered
//! metadata churn) and pushes it onto the watcher's event channel.

pub mod model;
pub mod translation;

pub use model::DirectoryChangeEvent;
pub use translation::PresenterAdapter;
