//! Python import resolution.

use std::path::{Path, PathBuf};

fn probe_module_path(repo_root: &Path, module_path: &Path) -> Option<String> {
    if repo_root.join(module_path).with_extension("py").is_file() {
        return Some(super::to_repo_relative(
            &module_path.with_extension("py"),
        ));
    }
    let init = module_path.join("__init__.py");
    if repo_root.join(&init).is_file() {
        return Some(super::to_repo_relative(&init));
    }
    None
}

/// Resolve a single candidate (as produced by the Python extractor) to a
/// repo-relative target path, or `None` if unresolvable.
///
/// `from_dir` is the repo-relative directory containing the importing
/// file. `candidate` is either a relative spec (leading dots) or an
/// absolute dotted module path.
pub fn resolve(repo_root: &Path, from_dir: &Path, candidate: &str) -> Option<String> {
    let leading_dots = candidate.chars().take_while(|c| *c == '.').count();
    if leading_dots > 0 {
        resolve_relative(repo_root, from_dir, leading_dots, &candidate[leading_dots..])
    } else {
        resolve_absolute(repo_root, candidate)
    }
}

fn resolve_relative(
    repo_root: &Path,
    from_dir: &Path,
    level: usize,
    remainder: &str,
) -> Option<String> {
    let mut base = from_dir.to_path_buf();
    for _ in 0..level.saturating_sub(1) {
        if !base.pop() {
            return None;
        }
    }
    if !remainder.is_empty() {
        for segment in remainder.split('.') {
            base.push(segment);
        }
    }
    if !super::within_repo_root(repo_root, &base) {
        return None;
    }
    probe_module_path(repo_root, &base)
}

fn search_roots(repo_root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if repo_root.join("src").is_dir() {
        roots.push(PathBuf::from("src"));
    }
    roots.push(PathBuf::new());
    roots
}

fn resolve_absolute(repo_root: &Path, module: &str) -> Option<String> {
    let segments: Vec<&str> = module.split('.').collect();
    for root in search_roots(repo_root) {
        let mut base = root.clone();
        for seg in &segments {
            base.push(seg);
        }
        if !super::within_repo_root(repo_root, &base) {
            continue;
        }
        if let Some(found) = probe_module_path(repo_root, &base) {
            return Some(found);
        }
    }
    None
}
