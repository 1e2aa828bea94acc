//! Human authorization surface.
//!
//! The gate policy asks a human to approve every destructive operation. The
//! surface itself belongs to the host (an editor modal, a terminal prompt);
//! this module only fixes the contract and the fail-mode when no surface is
//! usable. The default is fail-open: a broken approval UI must not turn
//! into a silent denial of service. Deployments that prefer strict denial
//! flip the policy to `FailMode::Closed`.

use crate::core::error::MandateError;
use std::io::{BufRead, Write};

/// Outcome of a modal confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Host-supplied modal confirmation capability.
pub trait ApprovalSurface: Send + Sync {
    /// Present `description` to the human operator and block until they
    /// answer. The host supplies any timeout.
    fn confirm(&self, description: &str) -> Result<Decision, MandateError>;
}

/// What to do when the surface is absent or errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailMode {
    /// Allow the operation (default).
    #[default]
    Open,
    /// Deny the operation.
    Closed,
}

/// Gate behavior around surface availability.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy {
    pub on_unavailable: FailMode,
}

/// Terminal y/N prompt, the surface used by the `mandate` binary. Anything
/// other than an explicit `y`/`yes` rejects.
pub struct TerminalPrompt;

impl ApprovalSurface for TerminalPrompt {
    fn confirm(&self, description: &str) -> Result<Decision, MandateError> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{} [y/N] ", description)?;
        stderr.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Decision::Approve),
            _ => Ok(Decision::Reject),
        }
    }
}
