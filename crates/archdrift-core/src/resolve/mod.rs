//! Import Resolver: turn an import specifier plus its source file's
//! location into a target file path, using language-specific search
//! rules. Resolution reads the real file tree (existence checks only,
//! never file contents) rooted at `repo_root`.

pub mod python;
pub mod tsconfig;
pub mod tsjs;

use std::path::{Path, PathBuf};

/// Probe `base` as-is (if it already carries one of `extensions`), then
/// `base.<ext>` for each extension, then `base/index.<ext>` for each
/// extension. Returns the first existing regular file, repo-relative,
/// forward-slash.
pub(crate) fn probe_file_candidates(
    repo_root: &Path,
    base: &Path,
    extensions: &[&str],
) -> Option<String> {
    let has_known_ext = base
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e))
        .unwrap_or(false);

    if has_known_ext && repo_root.join(base).is_file() {
        return Some(to_repo_relative(base));
    }

    for ext in extensions {
        let candidate = with_extension_suffix(base, ext);
        if repo_root.join(&candidate).is_file() {
            return Some(to_repo_relative(&candidate));
        }
    }

    for ext in extensions {
        let candidate = base.join(format!("index.{ext}"));
        if repo_root.join(&candidate).is_file() {
            return Some(to_repo_relative(&candidate));
        }
    }

    None
}

fn with_extension_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

pub(crate) fn to_repo_relative(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Reject any resolved candidate that would escape `repo_root`.
pub(crate) fn within_repo_root(repo_root: &Path, candidate: &Path) -> bool {
    !candidate
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
        && repo_root.join(candidate).starts_with(repo_root)
}
