//! The security gate: intent, ignore-list, scope, and human authorization
//! checks ahead of every destructive tool call.
//!
//! Policy order is fixed: safe tools pass untouched; a destructive call
//! needs a bound intent, an intent not on the disabled list, a target path
//! inside the intent's owned scope, and a human approval. The first failing
//! check blocks with a structured denial. Infrastructure faults inside the
//! later checks log and fall through: the operation is still subject to
//! the remaining checks, and a broken manifest or approval UI must not turn
//! into a silent denial of service.

use crate::core::authorize::{ApprovalSurface, AuthorizationPolicy, Decision, FailMode};
use crate::core::error::MandateError;
use crate::core::ignore::IgnoreCache;
use crate::core::intent;
use crate::core::scope;
use crate::core::session::Session;
use crate::hooks::registry::{GateDecision, PreToolHook};
use crate::tools::{self, DenialReason, ToolCall, ToolCapability, ToolError};

pub const SECURITY_GATE_ID: &str = "security_gate";

pub struct SecurityGate {
    ignore: IgnoreCache,
    surface: Option<Box<dyn ApprovalSurface>>,
    policy: AuthorizationPolicy,
}

impl SecurityGate {
    pub fn new(surface: Option<Box<dyn ApprovalSurface>>) -> Self {
        Self {
            ignore: IgnoreCache::new(),
            surface,
            policy: AuthorizationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AuthorizationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Human-readable description of what is being approved.
    fn describe(call: &ToolCall, intent_id: &str) -> String {
        if let Some(path) = call.str_param("path") {
            format!("[{}] {} -> {}", intent_id, call.tool, path)
        } else if let Some(command) = call.str_param("command") {
            format!("[{}] {}: {}", intent_id, call.tool, command)
        } else {
            format!("[{}] {}", intent_id, call.tool)
        }
    }

    /// Step 4: target path containment, when the tool declares one and the
    /// intent declares a non-empty owned scope.
    fn check_scope(
        &self,
        call: &ToolCall,
        session: &Session,
        intent_id: &str,
    ) -> Option<ToolError> {
        let path = call.str_param("path")?;
        let entry = match intent::find_intent(&session.workspace_root, intent_id) {
            Ok(Some(entry)) => entry,
            // Intent vanished from the manifest since selection; nothing to
            // enforce against.
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("scope check skipped, manifest unreadable: {}", e);
                return None;
            }
        };
        let owned = entry.owned_scope();
        if owned.is_empty() {
            return None;
        }
        let relative = match session.workspace_relative(path) {
            Ok(rel) => rel,
            // Outside the workspace entirely; no owned scope can contain it.
            Err(_) => {
                return Some(
                    ToolError::new(
                        &call.tool,
                        DenialReason::ScopeViolation,
                        format!("'{}' is outside the workspace of intent {}", path, intent_id),
                    )
                    .with_intent(intent_id)
                    .with_file(scope::normalize_slashes(path)),
                )
            }
        };
        if scope::is_within(&relative, &owned) {
            return None;
        }
        Some(
            ToolError::new(
                &call.tool,
                DenialReason::ScopeViolation,
                format!(
                    "'{}' is outside the owned scope of intent {} ({})",
                    relative,
                    intent_id,
                    owned.join(", ")
                ),
            )
            .with_intent(intent_id)
            .with_file(relative),
        )
    }

    /// Step 5: modal human approval.
    fn check_authorization(
        &self,
        call: &ToolCall,
        intent_id: &str,
    ) -> Option<ToolError> {
        let rejected = || {
            ToolError::new(
                &call.tool,
                DenialReason::UserRejected,
                format!("operator rejected {} for intent {}", call.tool, intent_id),
            )
            .with_intent(intent_id)
        };

        let outcome = match &self.surface {
            Some(surface) => surface.confirm(&Self::describe(call, intent_id)),
            None => Err(MandateError::SurfaceUnavailable),
        };
        match outcome {
            Ok(Decision::Approve) => None,
            Ok(Decision::Reject) => Some(rejected()),
            Err(e) => match self.policy.on_unavailable {
                FailMode::Open => {
                    tracing::warn!("authorization surface unavailable, allowing: {}", e);
                    None
                }
                FailMode::Closed => Some(rejected()),
            },
        }
    }
}

impl PreToolHook for SecurityGate {
    fn id(&self) -> &str {
        SECURITY_GATE_ID
    }

    fn evaluate(&self, call: &ToolCall, session: &Session) -> Result<GateDecision, MandateError> {
        // 1. Safe tools pass untouched.
        if tools::capability_of(&call.tool) == ToolCapability::Safe {
            return Ok(GateDecision::Allow);
        }

        // 2. A destructive call needs a bound intent.
        let Some(intent_id) = session.active_intent.as_deref() else {
            if call.tool == tools::TOOL_SELECT_INTENT {
                return Ok(GateDecision::Allow);
            }
            return Ok(GateDecision::Block(ToolError::new(
                &call.tool,
                DenialReason::MissingIntentId,
                "no active intent; call select_active_intent first",
            )));
        };

        // 3. Disabled-intent list.
        if self.ignore.is_ignored(&session.workspace_root, intent_id) {
            return Ok(GateDecision::Block(
                ToolError::new(
                    &call.tool,
                    DenialReason::IntentIgnored,
                    format!("intent {} is disabled by .intentignore", intent_id),
                )
                .with_intent(intent_id),
            ));
        }

        // 4. Owned-scope containment, ahead of the prompt: a violating call
        // never reaches the human.
        if let Some(error) = self.check_scope(call, session, intent_id) {
            return Ok(GateDecision::Block(error));
        }

        // 5. Modal approval.
        if let Some(error) = self.check_authorization(call, intent_id) {
            return Ok(GateDecision::Block(error));
        }

        Ok(GateDecision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Scripted {
        decision: Decision,
        asked: Arc<AtomicUsize>,
    }

    impl ApprovalSurface for Scripted {
        fn confirm(&self, _description: &str) -> Result<Decision, MandateError> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(self.decision)
        }
    }

    fn approving(asked: &Arc<AtomicUsize>) -> Option<Box<dyn ApprovalSurface>> {
        Some(Box::new(Scripted {
            decision: Decision::Approve,
            asked: asked.clone(),
        }))
    }

    fn write_call(path: &str) -> ToolCall {
        ToolCall::new(
            tools::TOOL_WRITE_FILE,
            serde_json::json!({"path": path, "content": "x"}),
        )
    }

    fn manifest(root: &std::path::Path, content: &str) {
        let path = layout::manifest_path(root);
        std::fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        std::fs::write(path, content).expect("write manifest");
    }

    fn blocked(gate: &SecurityGate, call: &ToolCall, session: &Session) -> Option<ToolError> {
        match gate.evaluate(call, session).expect("evaluate") {
            GateDecision::Block(error) => Some(error),
            GateDecision::Allow => None,
        }
    }

    #[test]
    fn test_safe_tool_skips_all_checks() {
        let tmp = TempDir::new().expect("tempdir");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(approving(&asked));
        let session = Session::new(tmp.path());
        let call = ToolCall::new(tools::TOOL_READ_FILE, serde_json::json!({"path": "a.txt"}));
        assert!(blocked(&gate, &call, &session).is_none());
        assert_eq!(asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_intent_blocks_destructive() {
        let tmp = TempDir::new().expect("tempdir");
        let gate = SecurityGate::new(None);
        let session = Session::new(tmp.path());
        let error = blocked(&gate, &write_call("src/a.ts"), &session).expect("blocked");
        assert_eq!(error.reason, DenialReason::MissingIntentId);
    }

    #[test]
    fn test_ignored_intent_blocks() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::write(layout::ignore_path(tmp.path()), "INT-9\n").expect("write");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(approving(&asked));
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-9".to_string());
        let error = blocked(&gate, &write_call("src/a.ts"), &session).expect("blocked");
        assert_eq!(error.reason, DenialReason::IntentIgnored);
        assert_eq!(asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scope_violation_blocks_before_prompt() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(approving(&asked));
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());

        let error = blocked(&gate, &write_call("docs/a.md"), &session).expect("blocked");
        assert_eq!(error.reason, DenialReason::ScopeViolation);
        assert_eq!(error.file.as_deref(), Some("docs/a.md"));
        assert_eq!(asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_owned_scope_skips_check() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(approving(&asked));
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());
        assert!(blocked(&gate, &write_call("docs/a.md"), &session).is_none());
        assert_eq!(asked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejection_blocks() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(Some(Box::new(Scripted {
            decision: Decision::Reject,
            asked: asked.clone(),
        })));
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());
        let error = blocked(&gate, &write_call("src/a.ts"), &session).expect("blocked");
        assert_eq!(error.reason, DenialReason::UserRejected);
    }

    #[test]
    fn test_unavailable_surface_fails_open_by_default() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let gate = SecurityGate::new(None);
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());
        assert!(blocked(&gate, &write_call("src/a.ts"), &session).is_none());
    }

    #[test]
    fn test_unavailable_surface_blocks_when_closed() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let gate = SecurityGate::new(None).with_policy(AuthorizationPolicy {
            on_unavailable: FailMode::Closed,
        });
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());
        let error = blocked(&gate, &write_call("src/a.ts"), &session).expect("blocked");
        assert_eq!(error.reason, DenialReason::UserRejected);
    }

    #[test]
    fn test_command_tool_skips_scope_check() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let asked = Arc::new(AtomicUsize::new(0));
        let gate = SecurityGate::new(approving(&asked));
        let mut session = Session::new(tmp.path());
        session.active_intent = Some("INT-1".to_string());
        let call = ToolCall::new(
            tools::TOOL_EXECUTE_COMMAND,
            serde_json::json!({"command": "cargo fmt"}),
        );
        assert!(blocked(&gate, &call, &session).is_none());
        assert_eq!(asked.load(Ordering::SeqCst), 1);
    }
}
