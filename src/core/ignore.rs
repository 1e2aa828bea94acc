//! Cache over the disabled-intent list.
//!
//! The list lives at `<workspace_root>/.intentignore`: one bare intent id
//! per line, `#` comments and blank lines permitted. The parsed list is
//! cached per workspace root and invalidated when the file's mtime changes,
//! so a mid-session edit takes effect on the next check without re-reading
//! on every call.

use crate::core::layout;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct CacheSlot {
    /// `None` while the backing file is absent.
    mtime: Option<SystemTime>,
    ids: Vec<String>,
}

/// mtime-invalidated cache of the disabled-intent list.
#[derive(Debug, Default)]
pub struct IgnoreCache {
    slots: Mutex<HashMap<PathBuf, CacheSlot>>,
}

impl IgnoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `intent_id` appears in the workspace's disabled-intent list.
    /// A missing or unreadable list reads as empty.
    pub fn is_ignored(&self, workspace_root: &Path, intent_id: &str) -> bool {
        let path = layout::ignore_path(workspace_root);
        let current_mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        let mut slots = self.slots.lock().unwrap();
        let stale = match slots.get(&path) {
            Some(slot) => slot.mtime != current_mtime,
            None => true,
        };
        if stale {
            let ids = read_ignore_list(&path);
            slots.insert(
                path.clone(),
                CacheSlot {
                    mtime: current_mtime,
                    ids,
                },
            );
        }

        slots
            .get(&path)
            .map(|slot| slot.ids.iter().any(|id| id == intent_id))
            .unwrap_or(false)
    }
}

fn read_ignore_list(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
