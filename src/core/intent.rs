//! Intent manifest and per-intent context assembly.
//!
//! The manifest at `.orchestration/active_intents.yaml` declares the units
//! of work an agent may bind to: an id, free-form constraints and scope
//! prose, and the enforceable `owned_scope` pattern list. It is re-read on
//! every load so mid-session edits take effect immediately.
//!
//! A context view joins one manifest entry with its slice of the trace
//! ledger and renders the result as a tagged document for the agent's
//! prompt. Views are built on demand and never persisted.

use crate::core::error::MandateError;
use crate::core::layout;
use crate::core::ledger::{self, TraceRecord};
use serde::Deserialize;
use std::path::Path;

/// One manifest entry.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentEntry {
    #[serde(alias = "intent_id")]
    pub id: String,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    owned_scope: Option<ScopeField>,
}

/// `owned_scope` accepts a bare string or a list of patterns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScopeField {
    One(String),
    Many(Vec<String>),
}

impl IntentEntry {
    /// Enforceable path patterns, normalized to forward slashes. Empty
    /// means no constraint declared.
    pub fn owned_scope(&self) -> Vec<String> {
        match &self.owned_scope {
            Some(ScopeField::One(pattern)) => vec![pattern.replace('\\', "/")],
            Some(ScopeField::Many(patterns)) => {
                patterns.iter().map(|p| p.replace('\\', "/")).collect()
            }
            None => Vec::new(),
        }
    }
}

/// The manifest document: a top-level list, or an object with an `intents`
/// list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestDoc {
    List(Vec<IntentEntry>),
    Wrapped { intents: Vec<IntentEntry> },
}

/// All manifest entries. A missing manifest reads as empty.
pub fn load_manifest(workspace_root: &Path) -> Result<Vec<IntentEntry>, MandateError> {
    let path = layout::manifest_path(workspace_root);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let doc: ManifestDoc = serde_yaml::from_str(&content)
        .map_err(|e| MandateError::Manifest(format!("{}: {}", path.display(), e)))?;
    Ok(match doc {
        ManifestDoc::List(entries) => entries,
        ManifestDoc::Wrapped { intents } => intents,
    })
}

/// Look up one intent by id.
pub fn find_intent(
    workspace_root: &Path,
    intent_id: &str,
) -> Result<Option<IntentEntry>, MandateError> {
    Ok(load_manifest(workspace_root)?
        .into_iter()
        .find(|entry| entry.id == intent_id))
}

/// Derived, ephemeral view of one intent: manifest fields plus the ledger
/// slice attributed to it, rendered for prompt injection.
#[derive(Debug, Clone)]
pub struct ContextView {
    pub intent_id: String,
    pub constraints: Option<String>,
    pub scope: Option<String>,
    pub owned_scope: Vec<String>,
    pub traces: Vec<TraceRecord>,
    pub rendered: String,
}

/// Build the context view for `intent_id`, or `None` when the manifest has
/// no such entry. A missing ledger contributes an empty history.
pub fn load_context(
    workspace_root: &Path,
    intent_id: &str,
) -> Result<Option<ContextView>, MandateError> {
    let Some(entry) = find_intent(workspace_root, intent_id)? else {
        return Ok(None);
    };
    let traces = ledger::read_for_intent(workspace_root, intent_id)?;
    let owned_scope = entry.owned_scope();
    let rendered = render_context(&entry, &owned_scope, &traces);
    Ok(Some(ContextView {
        intent_id: entry.id,
        constraints: entry.constraints,
        scope: entry.scope,
        owned_scope,
        traces,
        rendered,
    }))
}

fn render_context(entry: &IntentEntry, owned_scope: &[String], traces: &[TraceRecord]) -> String {
    let mut doc = String::new();
    doc.push_str(&format!("<intent_context id=\"{}\">\n", xml_escape(&entry.id)));
    if let Some(constraints) = &entry.constraints {
        doc.push_str(&format!(
            "  <constraints>{}</constraints>\n",
            xml_escape(constraints)
        ));
    }
    if let Some(scope) = &entry.scope {
        doc.push_str(&format!("  <scope>{}</scope>\n", xml_escape(scope)));
    }
    for pattern in owned_scope {
        doc.push_str(&format!(
            "  <owned_scope>{}</owned_scope>\n",
            xml_escape(pattern)
        ));
    }
    for record in traces {
        doc.push_str(&format!(
            "  <agent_trace>{} {} {} {}</agent_trace>\n",
            xml_escape(&record.timestamp),
            record.mutation_class.as_str(),
            xml_escape(&record.file),
            xml_escape(&record.content_hash)
        ));
    }
    doc.push_str("</intent_context>");
    doc
}

/// Escape text for embedding in the tagged context document.
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Inverse of [`xml_escape`].
pub fn xml_unescape(text: &str) -> String {
    text.replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}
