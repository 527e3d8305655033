//! baseline_status_schema.rs
//!
//! Validates that `archdrift baseline status` JSON output carries the
//! required top-level fields both before and after a baseline exists.
//! This is a pragmatic validation that does not require a JSON Schema
//! engine, matching this fixture directory's zero-external-Rust-deps
//! convention.
//!
//! Requires the `archdrift` CLI binary; skipped (not failed) if it has
//! not been built yet.

use std::env;
use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn archdrift_bin() -> Option<PathBuf> {
    if let Ok(p) = env::var("ARCHDRIFT_BIN") {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Some(pb);
        }
    }
    let p = workspace_root()
        .join("target")
        .join("debug")
        .join(if cfg!(windows) { "archdrift.exe" } else { "archdrift" });
    if p.exists() {
        Some(p)
    } else {
        None
    }
}

fn json_contains_all(s: &str, keys: &[&str]) -> bool {
    keys.iter().all(|k| s.contains(&format!("\"{k}\"")))
}

fn run(bin: &PathBuf, repo: &PathBuf, data_dir: &PathBuf, args: &[&str]) -> String {
    let output = Command::new(bin)
        .arg("--json")
        .arg("--repo")
        .arg(repo)
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("failed to spawn archdrift");
    assert!(output.status.success(), "archdrift {args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).expect("non-utf8 stdout")
}

#[test]
fn status_has_required_fields_before_and_after_generate() {
    let Some(bin) = archdrift_bin() else {
        eprintln!("skip: archdrift binary not found (set ARCHDRIFT_BIN or build archdrift-cli)");
        return;
    };

    let repo = workspace_root().join("tests").join("fixtures").join("repo_small");
    let data_dir = workspace_root().join("target").join("tmp").join("archdrift_status_schema");
    let _ = std::fs::remove_dir_all(&data_dir);

    let before = run(&bin, &repo, &data_dir, &["baseline", "status"]);
    assert!(
        json_contains_all(&before, &["repo_id", "exists"]),
        "status (missing baseline) missing required keys: {before}"
    );
    assert!(before.contains("\"exists\": false"), "expected no baseline yet: {before}");

    let generated = run(&bin, &repo, &data_dir, &["baseline", "generate"]);
    assert!(
        json_contains_all(&generated, &["repo_id", "baseline_hash_sha256", "edge_count", "included_files", "unmapped_files", "unresolved_imports"]),
        "baseline generate missing required keys: {generated}"
    );

    let after = run(&bin, &repo, &data_dir, &["baseline", "status"]);
    assert!(
        json_contains_all(&after, &["repo_id", "exists", "baseline_hash_sha256", "edge_count"]),
        "status (existing baseline) missing required keys: {after}"
    );
    assert!(after.contains("\"exists\": true"), "expected baseline to exist after generate: {after}");
}
