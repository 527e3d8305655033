//! Path Mapper: map a repo-relative file path to a module id via
//! longest-prefix match over configured roots.

use crate::errors::{ArchDriftError, ArchDriftResult};
use crate::model::{ArchitectureConfig, ModuleId};

/// Normalize a repo-relative path: backslash to slash, strip a leading
/// `./` or `/`, collapse repeated slashes. Total and idempotent:
/// `normalize_path(normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    let mut out = String::with_capacity(slashed.len());
    let mut last_was_slash = false;
    for ch in slashed.chars() {
        if ch == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
            out.push(ch);
        } else {
            last_was_slash = false;
            out.push(ch);
        }
    }
    let mut trimmed = out.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed = trimmed.trim_start_matches('/');
    trimmed.to_string()
}

/// `map(path, config) -> module_id`.
///
/// Ties on equal-length roots resolve to the first module in declaration
/// order. If `config.modules` is empty, shortcuts to `unmapped_module_id`.
/// An empty root on any module is a defensive configuration error.
pub fn map_path(path: &str, config: &ArchitectureConfig) -> ArchDriftResult<ModuleId> {
    if config.modules.is_empty() {
        return Ok(config.unmapped_module_id.clone());
    }

    let normalized = normalize_path(path);

    let mut best: Option<(usize, &ModuleId)> = None;
    for module in &config.modules {
        for root in &module.roots {
            if root.is_empty() {
                return Err(ArchDriftError::invalid_config(format!(
                    "module {:?} has an empty root",
                    module.id
                )));
            }
            let root_normalized = normalize_path(root);
            let matches = normalized == root_normalized
                || normalized
                    .strip_prefix(root_normalized.as_str())
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false);
            if !matches {
                continue;
            }
            let len = root_normalized.len();
            match best {
                Some((best_len, _)) if best_len >= len => {}
                _ => best = Some((len, &module.id)),
            }
        }
    }

    Ok(best
        .map(|(_, id)| id.clone())
        .unwrap_or_else(|| config.unmapped_module_id.clone()))
}
