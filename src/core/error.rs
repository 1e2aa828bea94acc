//! Error types for Mandate operations.
//!
//! This module defines the canonical error type used throughout Mandate.
//! All fallible core operations return `Result<T, MandateError>`.
//!
//! Policy denials delivered to the agent are NOT errors in this sense; they
//! travel as structured `tools::ToolError` payloads over the tool-result
//! channel and are never logged as faults.

use std::io;
use thiserror::Error;

/// Canonical error type for all Mandate operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait
/// implementations. Infrastructure faults carrying this type never block a
/// tool call on their own; the enclosing policy decision falls open.
#[derive(Error, Debug)]
pub enum MandateError {
    /// I/O error (auto-converts from `std::io::Error`)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Intent manifest could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Trace ledger read or append failure
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Path resolution or containment error
    #[error("Path error: {0}")]
    Path(String),

    /// Malformed tool parameters (missing `path`, non-string `content`, ...)
    #[error("Invalid tool parameters: {0}")]
    InvalidParams(String),

    /// Tool name with no registered implementation
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The host supplied no usable authorization surface
    #[error("Authorization surface unavailable")]
    SurfaceUnavailable,
}
