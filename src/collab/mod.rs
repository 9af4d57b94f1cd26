//! Interfaces to the collaborators around the pipeline: where source files
//! are listed and fetched from, where the finished report is archived, and
//! how it is delivered.
//!
//! Delivery and archival failures are reported as plain booleans; retrying
//! is left to whoever schedules the run.

pub mod local;

use std::time::SystemTime;

use crate::error::Result;

pub use local::{LocalArchive, LocalSources, StdoutDelivery};

/// One entry of a source location listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    /// Store-specific path accepted by [`SourceStore::fetch`] and
    /// [`SourceStore::list`].
    pub path: String,
    pub is_folder: bool,
    /// Last modification time, when the store knows it. Files are read
    /// oldest first.
    pub modified: Option<SystemTime>,
}

impl SourceEntry {
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Lists and fetches source files.
pub trait SourceStore {
    fn list(&self, location: &str) -> Result<Vec<SourceEntry>>;
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Sends the rendered report as a plain-text message.
pub trait Delivery {
    fn send(&mut self, body: &str) -> bool;
}

/// Persists reports and disposes of consumed sources.
pub trait Archive {
    fn store(&mut self, name: &str, bytes: &[u8]) -> bool;
    /// Moves `path` into `folder`, renaming on collision.
    fn relocate(&mut self, path: &str, folder: &str) -> bool;
    fn remove(&mut self, path: &str) -> bool;
}
