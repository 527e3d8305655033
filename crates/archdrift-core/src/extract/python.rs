//! Python import extraction.
//!
//! A full AST is unnecessary for this grammar's import forms; we scan
//! logical lines (joining parenthesized `from X import (...)` blocks)
//! with a small statement recognizer. A malformed logical line is skipped
//! rather than aborting the whole file, so syntax errors stay scoped to
//! the statement granularity we operate on.

use std::collections::BTreeSet;

use regex::Regex;
use std::sync::OnceLock;

use super::{dedupe_sorted, ImportSpec, LanguageExtractor};

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^import\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap())
}

fn from_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^from\s+(\.*)([A-Za-z_][A-Za-z0-9_.]*)?\s+import\s+(.+)$").unwrap()
    })
}

pub struct PythonExtractor;

impl PythonExtractor {
    /// Join continuation lines: a `from X import (` opens a parenthesized
    /// block that may span multiple physical lines; a trailing `\` also
    /// continues the logical line.
    fn logical_lines(text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut paren_depth: i32 = 0;
        for raw in text.lines() {
            let line = raw.trim_end();
            let continued_backslash = line.ends_with('\\');
            let content = if continued_backslash {
                &line[..line.len() - 1]
            } else {
                line
            };
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(content.trim());
            paren_depth += content.matches('(').count() as i32;
            paren_depth -= content.matches(')').count() as i32;
            if paren_depth <= 0 && !continued_backslash {
                if !current.trim().is_empty() {
                    lines.push(current.trim().to_string());
                }
                current.clear();
                paren_depth = 0;
            }
        }
        if !current.trim().is_empty() {
            lines.push(current.trim().to_string());
        }
        lines
    }
}

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, text: &str, internal_prefixes: &BTreeSet<String>) -> Vec<ImportSpec> {
        let mut specs = Vec::new();

        for line in Self::logical_lines(text) {
            if let Some(caps) = from_import_re().captures(&line) {
                let dots = &caps[1];
                let module = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let names_raw = caps[3].trim().trim_start_matches('(').trim_end_matches(')');

                if !dots.is_empty() {
                    // Relative import: group is a single "." * level + module.
                    let spec_str = format!("{dots}{module}");
                    specs.push(ImportSpec {
                        import_text: line.clone(),
                        candidates: vec![spec_str],
                    });
                    continue;
                }

                if module.is_empty() {
                    continue;
                }
                let top_level = module.split('.').next().unwrap_or(module);
                if !internal_prefixes.contains(top_level) {
                    continue;
                }

                let names: Vec<&str> = names_raw
                    .split(',')
                    .map(|n| n.trim())
                    .filter(|n| !n.is_empty() && *n != "*")
                    .map(|n| n.split_whitespace().next().unwrap_or(n))
                    .collect();

                if names.is_empty() {
                    continue;
                }

                // Submodule attempts first (X.Y.a, X.Y.b, ...), then the
                // package itself (X.Y) as the final fallback.
                let mut candidates: Vec<String> = names
                    .iter()
                    .map(|n| format!("{module}.{n}"))
                    .collect();
                candidates.push(module.to_string());

                specs.push(ImportSpec {
                    import_text: line.clone(),
                    candidates,
                });
            } else if let Some(caps) = import_re().captures(&line) {
                let module = &caps[1];
                let top_level = module.split('.').next().unwrap_or(module);
                if !internal_prefixes.contains(top_level) {
                    continue;
                }
                specs.push(ImportSpec {
                    import_text: line.clone(),
                    candidates: vec![module.to_string()],
                });
            }
        }

        dedupe_sorted(specs)
    }
}
