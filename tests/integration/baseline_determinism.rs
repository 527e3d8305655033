//! baseline_determinism.rs
//!
//! Black-box determinism check: generating a baseline twice for the same
//! fixture repository, into two different data directories, yields the
//! same `baseline_hash_sha256` and `edge_count`.
//!
//! Requires the `archdrift` CLI binary; skipped (not failed) if it has
//! not been built yet.
//!
//! How to run:
//! - build CLI: `cargo build -p archdrift-cli`
//! - then run this file's tests with your harness of choice.
//!
//! The binary path can be overridden via ARCHDRIFT_BIN.
//! No external Rust dependencies.

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

fn json_field<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\":");
    let start = body.find(&needle)? + needle.len();
    let rest = body[start..].trim_start();
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    let end = rest.find(|c| c == '"' || c == ',' || c == '\n' || c == '}')?;
    Some(rest[..end].trim_end_matches('"'))
}

fn run_generate(bin: &PathBuf, repo: &PathBuf, data_dir: &PathBuf) -> String {
    let output = Command::new(bin)
        .arg("--json")
        .arg("--repo")
        .arg(repo)
        .arg("--data-dir")
        .arg(data_dir)
        .arg("baseline")
        .arg("generate")
        .output()
        .expect("failed to spawn archdrift");
    assert!(
        output.status.success(),
        "archdrift baseline generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-utf8 stdout")
}

#[test]
fn baseline_hash_is_stable_across_runs() {
    let Some(bin) = archdrift_bin() else {
        eprintln!("skip: archdrift binary not found (set ARCHDRIFT_BIN or build archdrift-cli)");
        return;
    };

    let repo = workspace_root().join("tests").join("fixtures").join("repo_small");
    let data_dir_1 = workspace_root().join("target").join("tmp").join("archdrift_determinism_1");
    let data_dir_2 = workspace_root().join("target").join("tmp").join("archdrift_determinism_2");
    let _ = std::fs::remove_dir_all(&data_dir_1);
    let _ = std::fs::remove_dir_all(&data_dir_2);

    let first = run_generate(&bin, &repo, &data_dir_1);
    let second = run_generate(&bin, &repo, &data_dir_2);

    let hash_1 = json_field(&first, "baseline_hash_sha256").expect("missing hash in first run");
    let hash_2 = json_field(&second, "baseline_hash_sha256").expect("missing hash in second run");
    assert_eq!(hash_1, hash_2, "baseline hash differs across runs");

    let count_1 = json_field(&first, "edge_count").expect("missing edge_count");
    let count_2 = json_field(&second, "edge_count").expect("missing edge_count");
    assert_eq!(count_1, count_2);
    assert_eq!(count_1, "1", "fixture repo should produce exactly one edge (ui -> core)");
}
