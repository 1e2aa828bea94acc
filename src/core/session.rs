//! Per-task state.
//!
//! A session spans one agent task: a fresh task id, the workspace it runs
//! against, the directory tool paths resolve from, the intent the agent has
//! bound to, and the file-fingerprint snapshot backing the optimistic lock.
//! The snapshot starts empty and is dropped at task end.

use crate::core::error::MandateError;
use crate::core::time;
use crate::core::tracker::FileHashTracker;
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
pub struct Session {
    pub task_id: String,
    pub workspace_root: PathBuf,
    /// Working directory relative tool paths resolve against.
    pub cwd: PathBuf,
    /// Set by the intent-selection tool; required before destructive calls.
    pub active_intent: Option<String>,
    /// Flows into ledger records when present.
    pub model_identifier: Option<String>,
    pub tracker: FileHashTracker,
}

impl Session {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let cwd = workspace_root.clone();
        Self {
            task_id: time::new_task_id(),
            workspace_root,
            cwd,
            active_intent: None,
            model_identifier: None,
            tracker: FileHashTracker::new(),
        }
    }

    pub fn with_cwd(workspace_root: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        let mut session = Self::new(workspace_root);
        session.cwd = cwd.into();
        session
    }

    /// Resolve a tool-supplied path to workspace-relative, forward-slash
    /// form. Relative input resolves against the session working directory.
    /// A path that escapes the workspace root is an error.
    pub fn workspace_relative(&self, raw: &str) -> Result<String, MandateError> {
        let candidate = PathBuf::from(raw.replace('\\', "/"));
        let absolute = if candidate.is_absolute() {
            candidate
        } else {
            self.cwd.join(candidate)
        };
        let resolved = lexical_normalize(&absolute);
        let root = lexical_normalize(&self.workspace_root);
        let relative = resolved.strip_prefix(&root).map_err(|_| {
            MandateError::Path(format!("path '{}' escapes the workspace", raw))
        })?;
        Ok(relative.to_string_lossy().replace('\\', "/"))
    }

    /// End the task: drop the fingerprint snapshot.
    pub fn end(&mut self) {
        self.tracker.clear_all();
    }
}

/// Collapse `.` and `..` components without touching the filesystem; the
/// target of a write may not exist yet.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
