//! TS/JS import resolution: relative probing and tsconfig-backed
//! alias resolution.

use std::path::{Path, PathBuf};

use super::tsconfig::{match_paths, ResolvedTsConfig};

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Resolve a relative specifier (`./x`, `../x`) against the importing
/// file's directory.
pub fn resolve_relative(repo_root: &Path, from_dir: &Path, spec: &str) -> Option<String> {
    let base = from_dir.join(spec);
    if !super::within_repo_root(repo_root, &base) {
        return None;
    }
    super::probe_file_candidates(repo_root, &base, EXTENSIONS)
}

/// Resolve an absolute/alias specifier via a loaded tsconfig's `paths`
/// (longest prefix, single wildcard) then `baseUrl` fallback. Requires a
/// loaded config; candidates outside `repo_root` are rejected.
pub fn resolve_absolute(
    repo_root: &Path,
    tsconfig: &ResolvedTsConfig,
    spec: &str,
) -> Option<String> {
    for candidate in match_paths(tsconfig, spec) {
        let base = normalize_candidate(&candidate);
        if !super::within_repo_root(repo_root, &base) {
            continue;
        }
        if let Some(found) = super::probe_file_candidates(repo_root, &base, EXTENSIONS) {
            return Some(found);
        }
    }

    if let Some(base_url) = &tsconfig.base_url {
        let base = repo_relative(repo_root, base_url).join(spec);
        if super::within_repo_root(repo_root, &base) {
            if let Some(found) = super::probe_file_candidates(repo_root, &base, EXTENSIONS) {
                return Some(found);
            }
        }
    }

    None
}

fn normalize_candidate(path: &Path) -> PathBuf {
    path.components().collect()
}

fn repo_relative(repo_root: &Path, absolute: &Path) -> PathBuf {
    absolute
        .strip_prefix(repo_root)
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|_| absolute.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_relative_with_extension_fallback() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.ts"), "").unwrap();
        let resolved = resolve_relative(dir.path(), Path::new("src"), "./util").unwrap();
        assert_eq!(resolved, "src/util.ts");
    }

    #[test]
    fn resolves_relative_to_index() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/widgets")).unwrap();
        fs::write(dir.path().join("src/widgets/index.tsx"), "").unwrap();
        let resolved = resolve_relative(dir.path(), Path::new("src"), "./widgets").unwrap();
        assert_eq!(resolved, "src/widgets/index.tsx");
    }

    #[test]
    fn resolves_alias_via_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::write(dir.path().join("src/app/button.tsx"), "").unwrap();
        let mut cfg = ResolvedTsConfig::default();
        let mut paths = BTreeMap::new();
        paths.insert("@app/*".to_string(), vec!["src/app/*".to_string()]);
        cfg.paths = paths;
        let resolved = resolve_absolute(dir.path(), &cfg, "@app/button").unwrap();
        assert_eq!(resolved, "src/app/button.tsx");
    }

    #[test]
    fn falls_back_to_base_url() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.ts"), "").unwrap();
        let cfg = ResolvedTsConfig {
            base_url: Some(dir.path().join("src")),
            paths: BTreeMap::new(),
        };
        let resolved = resolve_absolute(dir.path(), &cfg, "util").unwrap();
        assert_eq!(resolved, "src/util.ts");
    }
}
