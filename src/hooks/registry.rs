//! Ordered hook execution with fail-safe semantics.
//!
//! Pre-hooks run in registration order and may block a call; the first
//! block short-circuits. A hook that errors is logged and skipped, so one
//! misbehaving hook cannot deny all tool execution. Post-hooks always run
//! and never propagate failures; by the time they fire the side effect has
//! already happened.

use crate::core::error::MandateError;
use crate::core::session::Session;
use crate::tools::{ToolCall, ToolError, ToolOutcome};

/// Verdict of a single pre-hook.
#[derive(Debug)]
pub enum GateDecision {
    Allow,
    Block(ToolError),
}

pub trait PreToolHook: Send + Sync {
    fn id(&self) -> &str;
    fn evaluate(&self, call: &ToolCall, session: &Session) -> Result<GateDecision, MandateError>;
}

pub trait PostToolHook: Send + Sync {
    fn id(&self) -> &str;
    fn observe(
        &self,
        call: &ToolCall,
        outcome: &ToolOutcome,
        session: &Session,
    ) -> Result<(), MandateError>;
}

/// Receiver for denial payloads on the tool-result channel.
pub trait ResultSink {
    fn deliver(&mut self, error: &ToolError);
}

impl ResultSink for Vec<ToolError> {
    fn deliver(&mut self, error: &ToolError) {
        self.push(error.clone());
    }
}

/// Ordered pre/post hook lists, identified by hook id.
#[derive(Default)]
pub struct HookRegistry {
    pre: Vec<Box<dyn PreToolHook>>,
    post: Vec<Box<dyn PostToolHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-hook. Registering an id twice is a no-op.
    pub fn register_pre(&mut self, hook: Box<dyn PreToolHook>) {
        if self.pre.iter().any(|h| h.id() == hook.id()) {
            tracing::warn!("pre-hook '{}' already registered, ignoring", hook.id());
            return;
        }
        self.pre.push(hook);
    }

    /// Register a post-hook. Registering an id twice is a no-op.
    pub fn register_post(&mut self, hook: Box<dyn PostToolHook>) {
        if self.post.iter().any(|h| h.id() == hook.id()) {
            tracing::warn!("post-hook '{}' already registered, ignoring", hook.id());
            return;
        }
        self.post.push(hook);
    }

    pub fn unregister_pre(&mut self, id: &str) {
        self.pre.retain(|h| h.id() != id);
    }

    pub fn unregister_post(&mut self, id: &str) {
        self.post.retain(|h| h.id() != id);
    }

    /// Run pre-hooks in order. Returns `false` when a hook blocked the
    /// call, after forwarding its denial payload to `sink`. A hook error
    /// is logged and the next hook runs.
    pub fn run_pre(&self, call: &ToolCall, session: &Session, sink: &mut dyn ResultSink) -> bool {
        for hook in &self.pre {
            match hook.evaluate(call, session) {
                Ok(GateDecision::Allow) => {}
                Ok(GateDecision::Block(error)) => {
                    sink.deliver(&error);
                    return false;
                }
                Err(e) => {
                    tracing::warn!("pre-hook '{}' failed on '{}': {}", hook.id(), call.tool, e);
                }
            }
        }
        true
    }

    /// Run every post-hook. Errors are logged, never propagated.
    pub fn run_post(&self, call: &ToolCall, outcome: &ToolOutcome, session: &Session) {
        for hook in &self.post {
            if let Err(e) = hook.observe(call, outcome, session) {
                tracing::warn!("post-hook '{}' failed on '{}': {}", hook.id(), call.tool, e);
            }
        }
    }
}
