//! The trace recorder: journals every successful file write.
//!
//! Runs as a post-hook, after the side effect has landed. Classifies the
//! mutation against the file's last committed version, stamps the current
//! workspace revision, and appends one ledger record. Failures here are
//! logged and never surfaced to the tool-result channel; the filesystem is
//! authoritative, the ledger is best-effort history.

use crate::core::classify::{self, MutationClass};
use crate::core::error::MandateError;
use crate::core::hash;
use crate::core::ledger::{self, RangeIndex, TraceRecord, VcsStamp};
use crate::core::session::Session;
use crate::core::time;
use crate::core::vcs;
use crate::hooks::registry::PostToolHook;
use crate::tools::{self, ToolCall, ToolOutcome};

pub const TRACE_RECORDER_ID: &str = "trace_recorder";

pub struct TraceRecorder;

impl PostToolHook for TraceRecorder {
    fn id(&self) -> &str {
        TRACE_RECORDER_ID
    }

    fn observe(
        &self,
        call: &ToolCall,
        outcome: &ToolOutcome,
        session: &Session,
    ) -> Result<(), MandateError> {
        if call.tool != tools::TOOL_WRITE_FILE || !outcome.is_success() {
            return Ok(());
        }
        let Some(intent_id) = call.str_param("intent_id") else {
            // The security gate should have stopped an unattributed write.
            tracing::warn!("write without intent_id, skipping trace record");
            return Ok(());
        };
        let (Some(path), Some(content)) = (call.str_param("path"), call.str_param("content"))
        else {
            tracing::warn!("write missing path/content params, skipping trace record");
            return Ok(());
        };

        let root = session.workspace_root.clone();
        let file = session
            .workspace_relative(path)
            .unwrap_or_else(|_| crate::core::scope::normalize_slashes(path));

        let old_content = vcs::head_version(&root, &file);
        let hint = call
            .str_param("mutation_class")
            .and_then(MutationClass::parse);
        let mutation_class = classify::classify(old_content.as_deref(), content, hint);

        let revision = vcs::current_revision(&root);
        let branch = vcs::current_branch(&root);
        let content_hash = hash::fingerprint(content);

        let record = TraceRecord {
            req_id: session.task_id.clone(),
            intent_id: intent_id.to_string(),
            file,
            timestamp: time::now_rfc3339(),
            mutation_class,
            content_hash: content_hash.clone(),
            model_identifier: session.model_identifier.clone(),
            related: vec![session.task_id.clone()],
            ranges: RangeIndex { content_hash },
            vcs: revision.map(|revision| VcsStamp { revision, branch }),
        };
        ledger::append(&root, &record)
    }
}
