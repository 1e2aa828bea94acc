//! Workspace layout for orchestration state.
//!
//! All Mandate state lives in files under the workspace root:
//! the intent manifest and the trace ledger under `.orchestration/`,
//! the disabled-intent list at the root.

use std::path::{Path, PathBuf};

pub const ORCHESTRATION_DIR: &str = ".orchestration";
pub const MANIFEST_FILE: &str = "active_intents.yaml";
pub const TRACE_FILE: &str = "agent_trace.jsonl";
pub const IGNORE_FILE: &str = ".intentignore";

pub fn orchestration_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(ORCHESTRATION_DIR)
}

pub fn manifest_path(workspace_root: &Path) -> PathBuf {
    orchestration_dir(workspace_root).join(MANIFEST_FILE)
}

pub fn trace_path(workspace_root: &Path) -> PathBuf {
    orchestration_dir(workspace_root).join(TRACE_FILE)
}

pub fn ignore_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(IGNORE_FILE)
}
