//! Structural-diff heuristic for labeling mutations.
//!
//! Classifies a file mutation as `AST_REFACTOR` (structure preserved) or
//! `INTENT_EVOLUTION` (structure changed) by comparing lightweight
//! regex-extracted features of the old and new content: top-level function
//! names, class-like type names, and module import specifiers. The heuristic
//! is deliberately cheap and language-agnostic; it furnishes a semantic
//! label for the ledger, nothing more.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Semantic label attached to every ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationClass {
    /// Structure preserved: same functions, classes, and imports.
    #[serde(rename = "AST_REFACTOR")]
    Refactor,
    /// Structure changed: something appeared, disappeared, or grew.
    #[serde(rename = "INTENT_EVOLUTION")]
    Evolution,
}

impl MutationClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationClass::Refactor => "AST_REFACTOR",
            MutationClass::Evolution => "INTENT_EVOLUTION",
        }
    }

    /// Parse the wire form; used for the agent's declared hint.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AST_REFACTOR" => Some(MutationClass::Refactor),
            "INTENT_EVOLUTION" => Some(MutationClass::Evolution),
            _ => None,
        }
    }
}

/// Top-level function declarations across the mainstream syntaxes the agent
/// edits: `function f`, `fn f`, `def f`, with common modifiers in front.
static FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:pub(?:\([a-z: ]+\))?\s+)?(?:export\s+)?(?:default\s+)?(?:static\s+)?(?:async\s+)?(?:function|fn|def)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

/// Class-like declarations: `class`, `struct`, `trait`, `interface`, `enum`.
static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:pub(?:\([a-z: ]+\))?\s+)?(?:export\s+)?(?:default\s+)?(?:abstract\s+)?(?:class|struct|trait|interface|enum)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

/// Module import specifiers: ES `import ... from 'x'`, Rust `use x`,
/// Python `from x import` / `import x`.
static IMPORT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"(?m)^[ \t]*import\s+(?:[^'"\n]*\s+from\s+)?['"]([^'"]+)['"]"#).unwrap(),
        Regex::new(r"(?m)^[ \t]*use\s+([A-Za-z_][A-Za-z0-9_:]*)").unwrap(),
        Regex::new(r"(?m)^[ \t]*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import").unwrap(),
        Regex::new(r"(?m)^[ \t]*import\s+([A-Za-z_][A-Za-z0-9_.]*)\s*$").unwrap(),
    ]
});

#[derive(Debug, Default, PartialEq, Eq)]
struct StructuralFeatures {
    functions: BTreeSet<String>,
    classes: BTreeSet<String>,
    imports: BTreeSet<String>,
}

fn extract_features(content: &str) -> StructuralFeatures {
    let capture_names = |re: &Regex| -> BTreeSet<String> {
        re.captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    };
    let mut imports = BTreeSet::new();
    for re in IMPORT_PATTERNS.iter() {
        imports.extend(capture_names(re));
    }
    StructuralFeatures {
        functions: capture_names(&FUNCTION_PATTERN),
        classes: capture_names(&CLASS_PATTERN),
        imports,
    }
}

/// Jaccard similarity of two name sets. Two empty sets compare as identical.
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

fn structural_similarity(old: &StructuralFeatures, new: &StructuralFeatures) -> f64 {
    0.4 * jaccard(&old.functions, &new.functions)
        + 0.4 * jaccard(&old.classes, &new.classes)
        + 0.2 * jaccard(&old.imports, &new.imports)
}

/// Fraction of index-paired lines that differ after trimming, measured
/// against the longer version.
fn content_change_ratio(old: &str, new: &str) -> f64 {
    let old_lines: Vec<&str> = old.lines().map(str::trim).collect();
    let new_lines: Vec<&str> = new.lines().map(str::trim).collect();
    let max_len = old_lines.len().max(new_lines.len());
    if max_len == 0 {
        return 0.0;
    }
    let changed = (0..max_len)
        .filter(|&i| old_lines.get(i) != new_lines.get(i))
        .count();
    changed as f64 / max_len as f64
}

/// Classify a mutation. Rules apply in order; the first match wins.
pub fn classify(
    old_content: Option<&str>,
    new_content: &str,
    hint: Option<MutationClass>,
) -> MutationClass {
    let Some(old) = old_content else {
        // New file.
        return MutationClass::Evolution;
    };
    if old == new_content {
        return MutationClass::Refactor;
    }

    let old_features = extract_features(old);
    let new_features = extract_features(new_content);
    let similarity = structural_similarity(&old_features, &new_features);
    let change_ratio = content_change_ratio(old, new_content);

    if similarity > 0.8 && change_ratio < 0.3 {
        return MutationClass::Refactor;
    }
    if old_features.functions != new_features.functions
        || old_features.classes != new_features.classes
    {
        return MutationClass::Evolution;
    }

    let old_line_count = old.lines().count();
    let new_line_count = new_content.lines().count();
    let line_delta = old_line_count.abs_diff(new_line_count);
    let growth = if old_line_count == 0 {
        if line_delta > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        line_delta as f64 / old_line_count as f64
    };
    if growth > 0.2 || line_delta > 50 {
        return MutationClass::Evolution;
    }
    if similarity < 0.5 {
        return MutationClass::Evolution;
    }
    if change_ratio > 0.5 {
        return MutationClass::Evolution;
    }

    if let Some(hint) = hint {
        if similarity > 0.6 && change_ratio < 0.4 {
            return hint;
        }
    }
    MutationClass::Refactor
}
