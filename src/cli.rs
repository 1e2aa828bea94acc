//! Read-only inspection CLI over orchestration state.
//!
//! The `mandate` binary never mutates the manifest, the ledger, or the
//! workspace; it renders what the mediation layer would see.

use crate::core::ignore::IgnoreCache;
use crate::core::intent;
use crate::core::ledger;
use crate::core::scope;
use crate::core::session::Session;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "mandate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Intent-gated tool mediation: inspect intents, traces, and scopes"
)]
pub struct Cli {
    /// Workspace root.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List intents declared in the manifest
    Intents {
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Render the tagged context document for one intent
    Context {
        #[clap(long)]
        intent: String,
    },
    /// Render the mutation timeline from the trace ledger
    Timeline {
        /// Limit to the N most recent records
        #[clap(long, default_value = "50")]
        limit: usize,
        /// Only records attributed to this intent
        #[clap(long)]
        intent: Option<String>,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Check a path against an intent's owned scope
    Scope {
        #[clap(long)]
        intent: String,
        #[clap(long)]
        file: String,
    },
    /// Check whether an intent is on the disabled list
    Ignored {
        #[clap(long)]
        intent: String,
    },
}

/// Dispatch a parsed CLI invocation. Returns the process exit code:
/// 0 on success, 1 on a negative check, 2 on error.
pub fn dispatch(cli: Cli) -> i32 {
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            2
        }
    }
}

fn run(cli: Cli) -> Result<i32, crate::core::error::MandateError> {
    match cli.command {
        Command::Intents { format } => {
            let entries = intent::load_manifest(&cli.root)?;
            if format == "json" {
                let rows: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "id": e.id,
                            "scope": e.scope,
                            "owned_scope": e.owned_scope(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows).unwrap());
            } else if entries.is_empty() {
                println!("no intents declared");
            } else {
                for entry in &entries {
                    let owned = entry.owned_scope();
                    println!(
                        "{}  {}  {}",
                        entry.id.bright_white().bold(),
                        entry.scope.as_deref().unwrap_or("-"),
                        if owned.is_empty() {
                            "(no owned scope)".dimmed().to_string()
                        } else {
                            owned.join(", ").cyan().to_string()
                        }
                    );
                }
            }
            Ok(0)
        }
        Command::Context { intent: intent_id } => {
            match intent::load_context(&cli.root, &intent_id)? {
                Some(view) => {
                    println!("{}", view.rendered);
                    Ok(0)
                }
                None => {
                    eprintln!("intent {} not found in manifest", intent_id);
                    Ok(1)
                }
            }
        }
        Command::Timeline {
            limit,
            intent: intent_id,
            format,
        } => {
            let mut records = match &intent_id {
                Some(id) => ledger::read_for_intent(&cli.root, id)?,
                None => ledger::read_all(&cli.root)?,
            };
            if records.len() > limit {
                records.drain(..records.len() - limit);
            }
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&records).unwrap());
            } else {
                println!(
                    "{:<26} {:<10} {:<18} {}",
                    "TIME", "INTENT", "CLASS", "FILE"
                );
                for record in &records {
                    println!(
                        "{:<26} {:<10} {:<18} {}",
                        record.timestamp,
                        record.intent_id,
                        record.mutation_class.as_str(),
                        record.file
                    );
                }
                println!("{} record(s)", records.len());
            }
            Ok(0)
        }
        Command::Scope {
            intent: intent_id,
            file,
        } => {
            let Some(entry) = intent::find_intent(&cli.root, &intent_id)? else {
                eprintln!("intent {} not found in manifest", intent_id);
                return Ok(1);
            };
            let owned = entry.owned_scope();
            let session = Session::new(&cli.root);
            let relative = session
                .workspace_relative(&file)
                .unwrap_or_else(|_| scope::normalize_slashes(&file));
            if owned.is_empty() {
                println!("{} declares no owned scope; '{}' is unconstrained", intent_id, relative);
                Ok(0)
            } else if scope::is_within(&relative, &owned) {
                println!("{} '{}' within scope of {}", "ok".bright_green(), relative, intent_id);
                Ok(0)
            } else {
                println!(
                    "{} '{}' outside scope of {} ({})",
                    "violation".bright_red(),
                    relative,
                    intent_id,
                    owned.join(", ")
                );
                Ok(1)
            }
        }
        Command::Ignored { intent: intent_id } => {
            if IgnoreCache::new().is_ignored(&cli.root, &intent_id) {
                println!("{} is disabled by .intentignore", intent_id);
                Ok(1)
            } else {
                println!("{} is active", intent_id);
                Ok(0)
            }
        }
    }
}
