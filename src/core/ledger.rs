//! Append-only semantic trace ledger.
//!
//! One JSON object per line in `.orchestration/agent_trace.jsonl`. Records
//! are immutable once appended; there is no rewriting, truncation, or
//! compaction. The filesystem remains the source of truth for file content;
//! the ledger is the semantic history layered on top of it.

use crate::core::classify::MutationClass;
use crate::core::error::MandateError;
use crate::core::layout;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One successful mutation, as journaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    pub req_id: String,
    pub intent_id: String,
    /// Workspace-relative, forward slashes.
    pub file: String,
    /// RFC 3339 UTC.
    pub timestamp: String,
    pub mutation_class: MutationClass,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
    #[serde(default)]
    pub related: Vec<String>,
    pub ranges: RangeIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsStamp>,
}

/// Spatial-index stub; `content_hash` must stay identical to the record's
/// primary hash until real range indexing lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeIndex {
    pub content_hash: String,
}

/// Workspace revision the mutation landed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsStamp {
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Append one record as a single line terminated by `\n`, creating the
/// orchestration directory if needed.
///
/// The append is a single filesystem write. Within one process the serial
/// tool-call ordering makes the ledger single-writer; concurrent appends
/// from other processes are not synchronized here and must be serialized by
/// the host if required.
pub fn append(workspace_root: &Path, record: &TraceRecord) -> Result<(), MandateError> {
    let path = layout::trace_path(workspace_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(record).map_err(|e| MandateError::Ledger(e.to_string()))?;
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// All records in append order. A missing ledger reads as empty; malformed
/// lines are skipped with a warning.
pub fn read_all(workspace_root: &Path) -> Result<Vec<TraceRecord>, MandateError> {
    let path = layout::trace_path(workspace_root);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TraceRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("skipping malformed ledger line {}: {}", idx + 1, e);
            }
        }
    }
    Ok(records)
}

/// Records attributed to one intent, in append order.
pub fn read_for_intent(
    workspace_root: &Path,
    intent_id: &str,
) -> Result<Vec<TraceRecord>, MandateError> {
    let mut records = read_all(workspace_root)?;
    records.retain(|r| r.intent_id == intent_id);
    Ok(records)
}
