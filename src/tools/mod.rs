//! Tool surface: capability classification, call envelopes, and the
//! structured error payload the agent self-corrects against.

pub mod broker;

use serde::{Deserialize, Serialize};

pub const TOOL_SELECT_INTENT: &str = "select_active_intent";
pub const TOOL_READ_FILE: &str = "read_file";
pub const TOOL_WRITE_FILE: &str = "write_to_file";
pub const TOOL_EXECUTE_COMMAND: &str = "execute_command";

/// Static capability classification, maintained alongside tool
/// registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCapability {
    Safe,
    Destructive,
}

/// Capability of a tool by name. Unknown tools classify as destructive.
pub fn capability_of(tool: &str) -> ToolCapability {
    match tool {
        TOOL_SELECT_INTENT | TOOL_READ_FILE => ToolCapability::Safe,
        _ => ToolCapability::Destructive,
    }
}

/// One tool invocation as issued by the agent.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: String,
    pub params: serde_json::Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            params,
        }
    }

    /// String-valued parameter, if present.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

/// Why a tool call was denied. A closed set; the agent dispatches its
/// corrective step on this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    MissingIntentId,
    IntentIgnored,
    ScopeViolation,
    UserRejected,
    IntentNotFound,
    StaleFile,
}

/// Structured denial payload, delivered to the agent through the normal
/// tool-result channel. Never logged as a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    #[serde(rename = "type")]
    pub kind: String,
    pub tool: String,
    pub reason: DenialReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub message: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, reason: DenialReason, message: impl Into<String>) -> Self {
        Self {
            kind: "tool_error".to_string(),
            tool: tool.into(),
            reason,
            intent_id: None,
            file: None,
            message: message.into(),
        }
    }

    pub fn with_intent(mut self, intent_id: impl Into<String>) -> Self {
        self.intent_id = Some(intent_id.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Result of a mediated tool call.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// The tool body ran; payload is tool-specific.
    Success(serde_json::Value),
    /// A gate or the tool body denied the call; no side effect happened.
    Denied(ToolError),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn denial(&self) -> Option<&ToolError> {
        match self {
            ToolOutcome::Denied(error) => Some(error),
            ToolOutcome::Success(_) => None,
        }
    }
}
