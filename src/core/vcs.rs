//! Read-only probe for the workspace version-control system.
//!
//! Every accessor degrades to `None`: missing `.git` metadata, a missing
//! `git` binary, a non-zero exit, or a probe that outlives its deadline all
//! read as "absent". Callers never see an error from this module.

use std::path::Path;
use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

/// Upper bound on any single probe; a wedged subprocess must not stall the
/// hook pipeline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn run_git(workspace_root: &Path, args: &[&str]) -> Option<String> {
    // Probe the metadata directory first; outside a repository there is
    // nothing to ask.
    if !workspace_root.join(".git").exists() {
        return None;
    }

    let root = workspace_root.to_path_buf();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let output = Command::new("git").args(&args).current_dir(&root).output();
        let _ = tx.send(output);
    });

    match rx.recv_timeout(PROBE_TIMEOUT) {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(_) => None,
        Err(_) => {
            tracing::warn!("vcs probe exceeded {:?}, treating as absent", PROBE_TIMEOUT);
            None
        }
    }
}

/// Current revision hash, or `None` outside a repository.
pub fn current_revision(workspace_root: &Path) -> Option<String> {
    run_git(workspace_root, &["rev-parse", "HEAD"])
        .map(|s| s.trim_end().to_string())
        .filter(|s| !s.is_empty())
}

/// Current branch name. `None` outside a repository or on a detached HEAD.
pub fn current_branch(workspace_root: &Path) -> Option<String> {
    run_git(workspace_root, &["rev-parse", "--abbrev-ref", "HEAD"])
        .map(|s| s.trim_end().to_string())
        .filter(|s| !s.is_empty() && s != "HEAD")
}

/// Content of `relative_path` as committed at `HEAD`, or `None` when the
/// file is not tracked there. Content comes back verbatim, untrimmed.
pub fn head_version(workspace_root: &Path, relative_path: &str) -> Option<String> {
    run_git(
        workspace_root,
        &["show", &format!("HEAD:{}", relative_path)],
    )
}
