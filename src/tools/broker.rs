//! The thin waist for tool execution.
//!
//! Every tool call routes through one broker: pre-hooks gate, the builtin
//! tool body runs, post-hooks observe. Within one task the sequence is
//! strictly serial; a call does not begin until the previous call's
//! post-hooks have completed. That ordering is what makes the per-task
//! optimistic lock sound.

use crate::core::authorize::ApprovalSurface;
use crate::core::error::MandateError;
use crate::core::intent;
use crate::core::session::Session;
use crate::hooks::registry::HookRegistry;
use crate::hooks::security::SecurityGate;
use crate::hooks::trace::TraceRecorder;
use crate::tools::{self, DenialReason, ToolCall, ToolError, ToolOutcome};
use std::process::Command;

pub struct ToolBroker {
    hooks: HookRegistry,
}

impl ToolBroker {
    /// A broker over an explicit hook registry.
    pub fn new(hooks: HookRegistry) -> Self {
        Self { hooks }
    }

    /// The standard pipeline: security gate ahead, trace recorder behind.
    pub fn standard(surface: Option<Box<dyn ApprovalSurface>>) -> Self {
        let mut hooks = HookRegistry::new();
        hooks.register_pre(Box::new(SecurityGate::new(surface)));
        hooks.register_post(Box::new(TraceRecorder));
        Self::new(hooks)
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Mediate one tool call.
    ///
    /// Policy denials come back as `ToolOutcome::Denied` for the agent to
    /// correct against; malformed parameters and unknown tools surface as
    /// errors on the host channel.
    pub fn dispatch(
        &self,
        session: &mut Session,
        call: &ToolCall,
    ) -> Result<ToolOutcome, MandateError> {
        let mut denials: Vec<ToolError> = Vec::new();
        if !self.hooks.run_pre(call, session, &mut denials) {
            let error = denials.pop().unwrap_or_else(|| {
                ToolError::new(&call.tool, DenialReason::UserRejected, "blocked by policy")
            });
            return Ok(ToolOutcome::Denied(error));
        }

        let outcome = self.run_tool(session, call)?;
        self.hooks.run_post(call, &outcome, session);
        Ok(outcome)
    }

    fn run_tool(
        &self,
        session: &mut Session,
        call: &ToolCall,
    ) -> Result<ToolOutcome, MandateError> {
        match call.tool.as_str() {
            tools::TOOL_SELECT_INTENT => select_active_intent(session, call),
            tools::TOOL_READ_FILE => read_file(session, call),
            tools::TOOL_WRITE_FILE => write_to_file(session, call),
            tools::TOOL_EXECUTE_COMMAND => execute_command(session, call),
            other => Err(MandateError::UnknownTool(other.to_string())),
        }
    }
}

fn require_str<'a>(call: &'a ToolCall, key: &str) -> Result<&'a str, MandateError> {
    call.str_param(key).ok_or_else(|| {
        MandateError::InvalidParams(format!("{} requires string '{}'", call.tool, key))
    })
}

fn select_active_intent(
    session: &mut Session,
    call: &ToolCall,
) -> Result<ToolOutcome, MandateError> {
    let intent_id = require_str(call, "intent_id")?;
    match intent::find_intent(&session.workspace_root, intent_id)? {
        Some(entry) => {
            session.active_intent = Some(entry.id.clone());
            Ok(ToolOutcome::Success(serde_json::json!({
                "intent_id": entry.id,
                "owned_scope": entry.owned_scope(),
            })))
        }
        None => Ok(ToolOutcome::Denied(
            ToolError::new(
                &call.tool,
                DenialReason::IntentNotFound,
                format!("intent {} is not in the manifest", intent_id),
            )
            .with_intent(intent_id),
        )),
    }
}

fn read_file(session: &mut Session, call: &ToolCall) -> Result<ToolOutcome, MandateError> {
    let path = require_str(call, "path")?;
    let relative = session.workspace_relative(path)?;
    let absolute = session.workspace_root.join(&relative);
    let content = std::fs::read_to_string(&absolute)?;
    session.tracker.store(&relative, &content);
    Ok(ToolOutcome::Success(serde_json::json!({
        "path": relative,
        "content": content,
    })))
}

fn write_to_file(session: &mut Session, call: &ToolCall) -> Result<ToolOutcome, MandateError> {
    let path = require_str(call, "path")?;
    let content = require_str(call, "content")?;
    let relative = session.workspace_relative(path)?;
    let absolute = session.workspace_root.join(&relative);

    // Optimistic lock: an existing file must still match the fingerprint
    // this task last observed. On conflict the write aborts and the agent
    // re-reads before retrying.
    if absolute.exists() {
        let on_disk = std::fs::read_to_string(&absolute)?;
        if !session.tracker.unchanged(&relative, &on_disk) {
            session.tracker.clear(&relative);
            return Ok(ToolOutcome::Denied(
                ToolError::new(
                    &call.tool,
                    DenialReason::StaleFile,
                    format!(
                        "'{}' changed on disk since it was last read; re-read before writing",
                        relative
                    ),
                )
                .with_file(relative),
            ));
        }
    }

    if let Some(parent) = absolute.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&absolute, content)?;
    session.tracker.store(&relative, content);

    Ok(ToolOutcome::Success(serde_json::json!({
        "path": relative,
        "bytes": content.len(),
    })))
}

fn execute_command(session: &mut Session, call: &ToolCall) -> Result<ToolOutcome, MandateError> {
    let command = require_str(call, "command")?;
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(&session.cwd)
        .output()?;
    Ok(ToolOutcome::Success(serde_json::json!({
        "exit_code": output.status.code(),
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout;
    use tempfile::TempDir;

    fn manifest(root: &std::path::Path, content: &str) {
        let path = layout::manifest_path(root);
        std::fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        std::fs::write(path, content).expect("write manifest");
    }

    fn broker() -> ToolBroker {
        // No approval surface; the default policy fails open.
        ToolBroker::standard(None)
    }

    fn select(broker: &ToolBroker, session: &mut Session, id: &str) -> ToolOutcome {
        broker
            .dispatch(
                session,
                &ToolCall::new(
                    tools::TOOL_SELECT_INTENT,
                    serde_json::json!({"intent_id": id}),
                ),
            )
            .expect("dispatch")
    }

    #[test]
    fn test_select_unknown_intent_denied() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        let broker = broker();
        let mut session = Session::new(tmp.path());
        let outcome = select(&broker, &mut session, "INT-404");
        assert_eq!(
            outcome.denial().map(|e| e.reason),
            Some(DenialReason::IntentNotFound)
        );
        assert!(session.active_intent.is_none());
    }

    #[test]
    fn test_select_then_write_round_trip() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n  owned_scope:\n    - src/**\n");
        let broker = broker();
        let mut session = Session::new(tmp.path());

        assert!(select(&broker, &mut session, "INT-1").is_success());
        let outcome = broker
            .dispatch(
                &mut session,
                &ToolCall::new(
                    tools::TOOL_WRITE_FILE,
                    serde_json::json!({
                        "path": "src/a.ts",
                        "content": "hello\n",
                        "intent_id": "INT-1",
                    }),
                ),
            )
            .expect("dispatch");
        assert!(outcome.is_success());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("src/a.ts")).expect("read"),
            "hello\n"
        );
    }

    #[test]
    fn test_stale_write_denied_and_disk_untouched() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        std::fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
        std::fs::write(tmp.path().join("src/a.ts"), "v1").expect("seed");

        let broker = broker();
        let mut session = Session::new(tmp.path());
        assert!(select(&broker, &mut session, "INT-1").is_success());

        let read = broker
            .dispatch(
                &mut session,
                &ToolCall::new(tools::TOOL_READ_FILE, serde_json::json!({"path": "src/a.ts"})),
            )
            .expect("dispatch");
        assert!(read.is_success());

        // Out-of-band editor wins the race.
        std::fs::write(tmp.path().join("src/a.ts"), "v2").expect("overwrite");

        let outcome = broker
            .dispatch(
                &mut session,
                &ToolCall::new(
                    tools::TOOL_WRITE_FILE,
                    serde_json::json!({
                        "path": "src/a.ts",
                        "content": "v3",
                        "intent_id": "INT-1",
                    }),
                ),
            )
            .expect("dispatch");
        assert_eq!(
            outcome.denial().map(|e| e.reason),
            Some(DenialReason::StaleFile)
        );
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("src/a.ts")).expect("read"),
            "v2"
        );
    }

    #[test]
    fn test_write_missing_params_is_host_error() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        let broker = broker();
        let mut session = Session::new(tmp.path());
        assert!(select(&broker, &mut session, "INT-1").is_success());

        let result = broker.dispatch(
            &mut session,
            &ToolCall::new(tools::TOOL_WRITE_FILE, serde_json::json!({"path": "a.ts"})),
        );
        assert!(matches!(result, Err(MandateError::InvalidParams(_))));
    }

    #[test]
    fn test_unknown_tool_is_host_error() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        let broker = broker();
        let mut session = Session::new(tmp.path());
        assert!(select(&broker, &mut session, "INT-1").is_success());

        let result = broker.dispatch(
            &mut session,
            &ToolCall::new("compile_universe", serde_json::json!({})),
        );
        assert!(matches!(result, Err(MandateError::UnknownTool(_))));
    }

    #[test]
    fn test_execute_command_captures_output() {
        let tmp = TempDir::new().expect("tempdir");
        manifest(tmp.path(), "- id: INT-1\n");
        let broker = broker();
        let mut session = Session::new(tmp.path());
        assert!(select(&broker, &mut session, "INT-1").is_success());

        let outcome = broker
            .dispatch(
                &mut session,
                &ToolCall::new(
                    tools::TOOL_EXECUTE_COMMAND,
                    serde_json::json!({"command": "printf gate-ok"}),
                ),
            )
            .expect("dispatch");
        match outcome {
            ToolOutcome::Success(value) => {
                assert_eq!(value["exit_code"], 0);
                assert_eq!(value["stdout"], "gate-ok");
            }
            ToolOutcome::Denied(error) => panic!("unexpected denial: {:?}", error),
        }
    }
}
