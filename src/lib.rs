//! Mandate: intent-gated tool mediation for autonomous agents
//!
//! **Mandate sits between a reasoning agent and its side-effecting tools.**
//!
//! Humans declare intents; agents bind to one and act through the broker.
//! Every destructive operation is attributed to a declared intent, confined
//! to the file scope that intent owns, approved by a human, checked against
//! the last-known state of the target file, and journaled to an append-only
//! semantic ledger linked to the workspace revision.
//!
//! # Core guarantees
//!
//! - **Attributed**: no destructive call without a bound intent
//! - **Confined**: writes stay inside the intent's owned scope
//! - **Approved**: a human confirms every destructive call
//! - **Consistent**: out-of-band edits abort the write, not the other way
//!   around
//! - **Journaled**: one immutable ledger line per successful mutation
//!
//! # Workspace state
//!
//! - `.orchestration/active_intents.yaml`: the intent manifest
//! - `.orchestration/agent_trace.jsonl`: the append-only trace ledger
//! - `.intentignore`: disabled intent ids
//!
//! # Example
//!
//! ```no_run
//! use mandate::core::session::Session;
//! use mandate::tools::broker::ToolBroker;
//! use mandate::tools::{ToolCall, TOOL_SELECT_INTENT, TOOL_WRITE_FILE};
//!
//! let broker = ToolBroker::standard(None);
//! let mut session = Session::new("/path/to/workspace");
//!
//! broker.dispatch(&mut session, &ToolCall::new(
//!     TOOL_SELECT_INTENT,
//!     serde_json::json!({"intent_id": "INT-001"}),
//! ))?;
//! broker.dispatch(&mut session, &ToolCall::new(
//!     TOOL_WRITE_FILE,
//!     serde_json::json!({
//!         "path": "src/api/client.ts",
//!         "content": "export {}\n",
//!         "intent_id": "INT-001",
//!     }),
//! ))?;
//! # Ok::<(), mandate::core::error::MandateError>(())
//! ```
//!
//! # Crate structure
//!
//! - [`core`]: primitives (fingerprints, VCS probe, scope matcher,
//!   classifier, intent loader, tracker, ledger, authorization contract)
//! - [`hooks`]: the pre/post mediation pipeline
//! - [`tools`]: capability table, builtin tools, and the broker

pub mod cli;
pub mod core;
pub mod hooks;
pub mod tools;
