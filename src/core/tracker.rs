//! Per-task file fingerprints backing the optimistic lock.
//!
//! The tracker holds the fingerprint of every file content this task has
//! read or written, keyed by workspace-relative path. Before overwriting an
//! existing file, callers re-read the disk content and ask `unchanged`; a
//! mismatch means an out-of-band writer got there first and the write must
//! abort. The snapshot is empty at task start and cleared at task end.

use crate::core::hash;
use crate::core::scope;
use std::collections::HashMap;

/// Snapshot of read-time content fingerprints for one task.
#[derive(Debug, Default)]
pub struct FileHashTracker {
    hashes: HashMap<String, String>,
}

impl FileHashTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the fingerprint of `content` as the last-known state of
    /// `path`. Call on every read and every successful write.
    pub fn store(&mut self, path: &str, content: &str) {
        self.hashes
            .insert(scope::normalize_slashes(path), hash::fingerprint(content));
    }

    /// Last-known fingerprint for `path`, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.hashes
            .get(&scope::normalize_slashes(path))
            .map(String::as_str)
    }

    /// Whether `current_content` still matches the last-known fingerprint.
    ///
    /// Returns `true` when no prior fingerprint exists, so first writes are
    /// never blocked.
    pub fn unchanged(&self, path: &str, current_content: &str) -> bool {
        match self.get(path) {
            Some(known) => known == hash::fingerprint(current_content),
            None => true,
        }
    }

    /// Forget `path`; the next write will be treated as a first write.
    pub fn clear(&mut self, path: &str) {
        self.hashes.remove(&scope::normalize_slashes(path));
    }

    /// Drop the whole snapshot (task end).
    pub fn clear_all(&mut self) {
        self.hashes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
