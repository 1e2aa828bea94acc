//! Shared timestamp and identifier helpers for ledger envelopes.

use chrono::{SecondsFormat, Utc};
use ulid::Ulid;

/// RFC 3339 UTC timestamp with millisecond precision and trailing `Z`
/// (e.g. `2025-01-15T10:30:00.000Z`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Mint a fresh task identifier.
pub fn new_task_id() -> String {
    Ulid::new().to_string()
}
