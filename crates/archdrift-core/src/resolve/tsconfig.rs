//! tsconfig/jsconfig loading: JSONC comments, `extends` chains,
//! and `paths`/`baseUrl` resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ArchDriftError, ArchDriftResult};

const MAX_EXTENDS_DEPTH: usize = 8;

/// A fully-resolved `compilerOptions.paths` + `baseUrl`, after following
/// the `extends` chain. Child `paths` fully replace parent `paths` per
/// key (not merged entry-by-entry).
#[derive(Debug, Clone, Default)]
pub struct ResolvedTsConfig {
    pub base_url: Option<PathBuf>,
    pub paths: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct RawTsConfig {
    extends: Option<String>,
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<RawCompilerOptions>,
}

#[derive(Debug, Deserialize, Default)]
struct RawCompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
}

/// Strip `//` line comments and `/* */` block comments from JSONC,
/// respecting string literals so that a `//` inside a string is left
/// untouched.
pub fn strip_jsonc_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if in_string {
            out.push(c);
            if c == '\\' && next.is_some() {
                out.push(next.unwrap());
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn load_raw(path: &Path) -> ArchDriftResult<RawTsConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ArchDriftError::io(path.to_string_lossy(), e))?;
    let stripped = strip_jsonc_comments(&text);
    let value: Value = serde_json::from_str(&stripped)
        .map_err(|e| ArchDriftError::json(path.to_string_lossy(), e))?;
    serde_json::from_value(value).map_err(|e| ArchDriftError::json(path.to_string_lossy(), e))
}

/// Load `config_path` (a `tsconfig.json` or `jsconfig.json`), following
/// `extends` up to a depth cap. Child `compilerOptions.paths` fully
/// replace the parent's per declared key; `baseUrl` follows normal
/// override precedence (child wins if set).
pub fn load(config_path: &Path) -> ArchDriftResult<ResolvedTsConfig> {
    load_chain(config_path, 0)
}

fn load_chain(config_path: &Path, depth: usize) -> ArchDriftResult<ResolvedTsConfig> {
    if depth > MAX_EXTENDS_DEPTH {
        return Err(ArchDriftError::invalid_config(format!(
            "tsconfig extends chain exceeds depth cap at {}",
            config_path.to_string_lossy()
        )));
    }
    let raw = load_raw(config_path)?;
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut resolved = if let Some(parent_spec) = &raw.extends {
        let parent_path = resolve_extends_path(dir, parent_spec);
        load_chain(&parent_path, depth + 1)?
    } else {
        ResolvedTsConfig::default()
    };

    if let Some(opts) = raw.compiler_options {
        if let Some(base_url) = opts.base_url {
            resolved.base_url = Some(dir.join(base_url));
        }
        if let Some(paths) = opts.paths {
            for (key, value) in paths {
                resolved.paths.insert(key, value);
            }
        }
    }

    Ok(resolved)
}

fn resolve_extends_path(dir: &Path, spec: &str) -> PathBuf {
    let mut candidate = dir.join(spec);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    candidate
}

/// Match `spec` against `paths` using exactly-one-`*`-wildcard,
/// longest-prefix semantics, returning resolved candidate target
/// fragments (still unprobed for existence).
pub fn match_paths(cfg: &ResolvedTsConfig, spec: &str) -> Vec<PathBuf> {
    let mut best_key_len = 0usize;
    let mut best_targets: Vec<&str> = Vec::new();

    for (key, targets) in &cfg.paths {
        if let Some(star_idx) = key.find('*') {
            let prefix = &key[..star_idx];
            let suffix = &key[star_idx + 1..];
            if spec.starts_with(prefix) && spec.ends_with(suffix) && spec.len() >= prefix.len() + suffix.len() {
                if prefix.len() > best_key_len {
                    best_key_len = prefix.len();
                    best_targets = targets.iter().map(|s| s.as_str()).collect();
                }
            }
        } else if key == spec && key.len() >= best_key_len {
            best_key_len = key.len() + 1;
            best_targets = targets.iter().map(|s| s.as_str()).collect();
        }
    }

    best_targets
        .into_iter()
        .map(|target| PathBuf::from(expand_wildcard(target, cfg, spec)))
        .collect()
}

fn expand_wildcard(target: &str, cfg: &ResolvedTsConfig, spec: &str) -> String {
    if let Some(star_idx) = target.find('*') {
        for (key, _) in &cfg.paths {
            if let Some(key_star) = key.find('*') {
                let prefix = &key[..key_star];
                let suffix = &key[key_star + 1..];
                if spec.starts_with(prefix) && spec.ends_with(suffix) {
                    let captured = &spec[prefix.len()..spec.len() - suffix.len()];
                    let mut out = target.to_string();
                    out.replace_range(star_idx..star_idx + 1, captured);
                    return out;
                }
            }
        }
        target.replace('*', "")
    } else {
        target.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn strips_jsonc_comments_but_preserves_strings() {
        let text = r#"{
            // comment
            "a": "http://example.com", /* block */ "b": 1
        }"#;
        let stripped = strip_jsonc_comments(text);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], "http://example.com");
        assert_eq!(value["b"], 1);
    }

    #[test]
    fn child_paths_replace_parent_paths_per_key() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("base.json"),
            r#"{"compilerOptions":{"baseUrl":".","paths":{"@app/*":["src/app/*"],"@lib/*":["src/lib/*"]}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"extends":"./base.json","compilerOptions":{"paths":{"@app/*":["app2/*"]}}}"#,
        )
        .unwrap();
        let resolved = load(&dir.path().join("tsconfig.json")).unwrap();
        assert_eq!(resolved.paths.get("@app/*").unwrap(), &vec!["app2/*".to_string()]);
        assert_eq!(
            resolved.paths.get("@lib/*").unwrap(),
            &vec!["src/lib/*".to_string()]
        );
    }

    #[test]
    fn match_paths_uses_longest_prefix_with_wildcard() {
        let mut cfg = ResolvedTsConfig::default();
        cfg.paths.insert("@app/*".into(), vec!["src/app/*".into()]);
        cfg.paths
            .insert("@app/widgets/*".into(), vec!["src/widgets/*".into()]);
        let targets = match_paths(&cfg, "@app/widgets/button");
        assert_eq!(targets, vec![PathBuf::from("src/widgets/button")]);
    }
}
