//! Dependency Graph Builder: bounded tree walk, import extraction
//! and resolution, module mapping, and evidence collection.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::GraphLimits;
use crate::errors::ArchDriftResult;
use crate::extract::python::PythonExtractor;
use crate::extract::tsjs::TsJsExtractor;
use crate::extract::LanguageExtractor;
use crate::model::{ArchitectureConfig, Edge, EdgeSet, ModuleId};
use crate::pathmap::map_path;
use crate::resolve::tsconfig::{self, ResolvedTsConfig};
use crate::resolve::{python as resolve_python, tsjs as resolve_tsjs};

const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "jsx", "ts", "tsx"];
const IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "out",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    "target",
    ".mypy_cache",
    ".pytest_cache",
];
const MAX_UNMAPPED_BUCKETS: usize = 200;
const TOP_BUCKETS_REPORTED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub from_file: String,
    pub to_file: String,
    pub import_ref: String,
    pub from_module: ModuleId,
    pub to_module: ModuleId,
    pub lang: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphResult {
    pub edges: EdgeSet,
    pub evidence: Vec<Evidence>,
    pub scanned_files: usize,
    pub included_files: usize,
    pub skipped_files: usize,
    pub unmapped_files: usize,
    pub unresolved_imports: usize,
    pub unmapped_buckets: Vec<(String, usize)>,
}

/// Derive internal import prefixes from the top-level path segment of
/// every declared module root (e.g. root `src/core` contributes `src`).
///
/// Used where there is no live filesystem to scan — the commit delta
/// extractor only has the changed blobs for one commit, not a checkout —
/// so it falls back to the config's own root declarations.
pub fn internal_prefixes_from_config(config: &ArchitectureConfig) -> BTreeSet<String> {
    let mut prefixes = BTreeSet::new();
    for module in &config.modules {
        for root in &module.roots {
            let normalized = crate::pathmap::normalize_path(root);
            let top = normalized.split('/').next().unwrap_or(&normalized);
            prefixes.insert(top.to_string());
        }
    }
    prefixes
}

fn dir_contains_py_file(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some("py")
        })
}

/// Detect internal Python top-level package prefixes by scanning
/// `repo_root/src`'s immediate children (if `src` exists) and
/// `repo_root`'s own immediate children, keeping any directory that
/// contains at least one `.py` file anywhere beneath it.
fn detect_python_internal_prefixes(repo_root: &Path) -> BTreeSet<String> {
    let mut prefixes = BTreeSet::new();

    let src_dir = repo_root.join("src");
    if src_dir.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&src_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                if entry.path().is_dir() && dir_contains_py_file(&entry.path()) {
                    if let Some(name) = entry.file_name().to_str() {
                        prefixes.insert(name.to_string());
                    }
                }
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(repo_root) {
        for entry in entries.filter_map(|e| e.ok()) {
            if entry.file_name() == "src" {
                continue;
            }
            if entry.path().is_dir() && dir_contains_py_file(&entry.path()) {
                if let Some(name) = entry.file_name().to_str() {
                    prefixes.insert(name.to_string());
                }
            }
        }
    }

    prefixes
}

fn is_ignored_dir(name: &str) -> bool {
    IGNORE_DIRS.contains(&name)
}

fn language_of(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Some("python"),
        Some("js") | Some("jsx") => Some("javascript"),
        Some("ts") | Some("tsx") => Some("typescript"),
        _ => None,
    }
}

fn collect_source_files(repo_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(repo_root).into_iter().filter_entry(|entry| {
        if entry.file_type().is_dir() {
            entry
                .file_name()
                .to_str()
                .map(|name| !is_ignored_dir(name))
                .unwrap_or(true)
        } else {
            true
        }
    });
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry.path().extension().and_then(|e| e.to_str());
        if ext.map(|e| SOURCE_EXTENSIONS.contains(&e)).unwrap_or(false) {
            if let Ok(rel) = entry.path().strip_prefix(repo_root) {
                files.push(rel.to_path_buf());
            }
        }
    }
    files.sort();
    files
}

fn load_ts_config(repo_root: &Path) -> Option<ResolvedTsConfig> {
    for name in ["tsconfig.json", "jsconfig.json"] {
        let candidate = repo_root.join(name);
        if candidate.is_file() {
            if let Ok(cfg) = tsconfig::load(&candidate) {
                return Some(cfg);
            }
        }
    }
    None
}

fn bucket_key(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    match segments.len() {
        0 => "__other__".to_string(),
        1 => segments[0].to_string(),
        _ => format!("{}/{}", segments[0], segments[1]),
    }
}

/// `build_graph(repo_root, config, limits) -> GraphResult`.
pub fn build_graph(
    repo_root: &Path,
    config: &ArchitectureConfig,
    limits: &GraphLimits,
) -> ArchDriftResult<GraphResult> {
    let python_internal_prefixes = detect_python_internal_prefixes(repo_root);
    let python_extractor = PythonExtractor;
    let tsjs_extractor = TsJsExtractor {
        include_absolute: true,
    };
    let ts_config = load_ts_config(repo_root);

    let mut candidates = collect_source_files(repo_root);
    let scanned_files = candidates.len();
    if candidates.len() > limits.max_files {
        candidates.truncate(limits.max_files);
    }

    let mut result = GraphResult {
        scanned_files,
        ..Default::default()
    };
    let mut edges: BTreeSet<Edge> = BTreeSet::new();
    let mut bucket_counts: std::collections::BTreeMap<String, usize> = Default::default();
    let mut overflow_bucket = 0usize;

    for rel_path in &candidates {
        let abs_path = repo_root.join(rel_path);
        let metadata = match std::fs::metadata(&abs_path) {
            Ok(m) => m,
            Err(_) => {
                result.skipped_files += 1;
                continue;
            }
        };
        if metadata.len() as usize > limits.max_file_bytes {
            debug!(path = %rel_path.display(), bytes = metadata.len(), "skipping oversized file");
            result.skipped_files += 1;
            continue;
        }

        let bytes = match std::fs::read(&abs_path) {
            Ok(b) => b,
            Err(err) => {
                warn!(path = %rel_path.display(), %err, "skipping unreadable file");
                result.skipped_files += 1;
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let rel_str = crate::pathmap::normalize_path(&rel_path.to_string_lossy());
        let from_module = map_path(&rel_str, config)?;

        result.included_files += 1;

        if from_module == config.unmapped_module_id {
            result.unmapped_files += 1;
            let key = bucket_key(&rel_str);
            if bucket_counts.contains_key(&key) || bucket_counts.len() < MAX_UNMAPPED_BUCKETS {
                *bucket_counts.entry(key).or_insert(0) += 1;
            } else {
                overflow_bucket += 1;
            }
            continue;
        }

        let lang = language_of(rel_path).unwrap_or("unknown");
        let from_dir = rel_path.parent().unwrap_or_else(|| Path::new(""));

        let specs = if lang == "python" {
            python_extractor.extract(&text, &python_internal_prefixes)
        } else {
            // `include_absolute: true` makes the extractor keep every
            // absolute/aliased specifier regardless of this set; the
            // accept/reject decision is deferred to resolution below.
            tsjs_extractor.extract(&text, &BTreeSet::new())
        };

        for spec in specs {
            let resolved = if lang == "python" {
                spec.candidates
                    .iter()
                    .find_map(|cand| resolve_python::resolve(repo_root, from_dir, cand))
            } else {
                spec.candidates.iter().find_map(|cand| {
                    if cand.starts_with("./") || cand.starts_with("../") {
                        resolve_tsjs::resolve_relative(repo_root, from_dir, cand)
                    } else {
                        ts_config
                            .as_ref()
                            .and_then(|cfg| resolve_tsjs::resolve_absolute(repo_root, cfg, cand))
                    }
                })
            };

            let resolved = match resolved {
                Some(r) => r,
                None => {
                    debug!(from = %rel_str, import = %spec.import_text, "unresolved import");
                    result.unresolved_imports += 1;
                    continue;
                }
            };

            let to_module = map_path(&resolved, config)?;
            if to_module == config.unmapped_module_id || to_module == from_module {
                continue;
            }

            edges.insert(Edge::new(from_module.clone(), to_module.clone()));

            if result.evidence.len() < limits.max_evidence {
                result.evidence.push(Evidence {
                    from_file: rel_str.clone(),
                    to_file: resolved,
                    import_ref: spec.import_text.clone(),
                    from_module: from_module.clone(),
                    to_module,
                    lang,
                });
            }
        }
    }

    if overflow_bucket > 0 {
        bucket_counts.insert("__other__".to_string(), overflow_bucket);
    }

    let mut buckets: Vec<(String, usize)> = bucket_counts.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    buckets.truncate(TOP_BUCKETS_REPORTED);
    result.unmapped_buckets = buckets;

    result.evidence.sort_by(|a, b| {
        (
            &a.from_file,
            &a.from_module,
            &a.to_module,
            &a.import_ref,
        )
            .cmp(&(&b.from_file, &b.from_module, &b.to_module, &b.import_ref))
    });

    result.edges = EdgeSet::normalize(edges)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Module;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> ArchitectureConfig {
        ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![
                Module {
                    id: "core".into(),
                    roots: vec!["core".into()],
                },
                Module {
                    id: "ui".into(),
                    roots: vec!["ui".into()],
                },
            ],
            deny_by_default: true,
            allowed_edges: vec![],
            exceptions: vec![],
        }
    }

    #[test]
    fn builds_edge_from_relative_python_import() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui")).unwrap();
        fs::create_dir_all(dir.path().join("core")).unwrap();
        // The relative-import group carries only the dotted package ref
        // (names are dropped,), so resolution probes `core.py` /
        // `core/__init__.py` — never `core/svc.py` — hence the `__init__.py`.
        fs::write(dir.path().join("core/__init__.py"), "").unwrap();
        fs::write(dir.path().join("core/svc.py"), "").unwrap();
        fs::write(
            dir.path().join("ui/widget.py"),
            "from ..core import svc\n",
        )
        .unwrap();

        let result = build_graph(dir.path(), &config(), &GraphLimits::default()).unwrap();
        assert_eq!(result.edges.as_slice(), &[Edge::new("ui", "core")]);
        assert_eq!(result.included_files, 3);
        assert_eq!(result.unmapped_files, 0);
    }

    #[test]
    fn oversized_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x".repeat(10)).unwrap();
        let mut limits = GraphLimits::default();
        limits.max_file_bytes = 5;
        let result = build_graph(dir.path(), &config(), &limits).unwrap();
        assert_eq!(result.skipped_files, 1);
        assert_eq!(result.included_files, 0);
    }

    #[test]
    fn unmapped_file_bumps_counter_and_bucket() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/guides")).unwrap();
        fs::write(dir.path().join("docs/guides/readme.ts"), "").unwrap();
        let result = build_graph(dir.path(), &config(), &GraphLimits::default()).unwrap();
        assert_eq!(result.unmapped_files, 1);
        assert_eq!(result.unmapped_buckets, vec![("docs/guides".to_string(), 1)]);
    }

    #[test]
    fn unresolvable_import_bumps_counter() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("core")).unwrap();
        fs::write(
            dir.path().join("core/a.py"),
            "from .missing import thing\n",
        )
        .unwrap();
        let result = build_graph(dir.path(), &config(), &GraphLimits::default()).unwrap();
        assert_eq!(result.unresolved_imports, 1);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn absolute_import_resolves_under_nested_src_layout() {
        // Module roots live under `src/`, so the top-level path segment of
        // each root is "src" — the internal-prefix set must come from
        // scanning the filesystem for packages, not from the config roots,
        // or `import core.svc` below is wrongly treated as external.
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/core")).unwrap();
        fs::create_dir_all(dir.path().join("src/ui")).unwrap();
        fs::write(dir.path().join("src/core/__init__.py"), "").unwrap();
        fs::write(dir.path().join("src/core/svc.py"), "").unwrap();
        fs::write(dir.path().join("src/ui/widget.py"), "import core.svc\n").unwrap();

        let cfg = ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![
                Module {
                    id: "core".into(),
                    roots: vec!["src/core".into()],
                },
                Module {
                    id: "ui".into(),
                    roots: vec!["src/ui".into()],
                },
            ],
            deny_by_default: true,
            allowed_edges: vec![],
            exceptions: vec![],
        };

        let result = build_graph(dir.path(), &cfg, &GraphLimits::default()).unwrap();
        assert_eq!(result.edges.as_slice(), &[Edge::new("ui", "core")]);
    }

    #[test]
    fn tsjs_alias_import_resolves_via_tsconfig_paths() {
        // Extraction must keep absolute/aliased specifiers unconditionally
        // (include_absolute: true) so resolution — not the extractor — is
        // what decides whether a `@app/*`-style alias is internal.
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::create_dir_all(dir.path().join("src/ui")).unwrap();
        fs::write(dir.path().join("src/app/widget.ts"), "").unwrap();
        fs::write(
            dir.path().join("src/ui/consumer.ts"),
            "import { Widget } from '@app/widget';\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{"compilerOptions":{"paths":{"@app/*":["src/app/*"]}}}"#,
        )
        .unwrap();

        let cfg = ArchitectureConfig {
            version: "1.0".into(),
            unmapped_module_id: "unmapped".into(),
            modules: vec![
                Module {
                    id: "app".into(),
                    roots: vec!["src/app".into()],
                },
                Module {
                    id: "ui".into(),
                    roots: vec!["src/ui".into()],
                },
            ],
            deny_by_default: true,
            allowed_edges: vec![],
            exceptions: vec![],
        };

        let result = build_graph(dir.path(), &cfg, &GraphLimits::default()).unwrap();
        assert_eq!(result.edges.as_slice(), &[Edge::new("ui", "app")]);
    }
}
