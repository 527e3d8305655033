//! doctor_smoke.rs
//!
//! `archdrift doctor` against the small fixture repo reports the three
//! config files present and the architecture config loading cleanly.
//! It does not require git or a baseline to already exist.
//!
//! Requires the `archdrift` CLI binary; skipped (not failed) if it has
//! not been built yet. No external Rust dependencies.

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

#[test]
fn doctor_reports_config_files_present() {
    let Some(bin) = archdrift_bin() else {
        eprintln!("skip: archdrift binary not found (set ARCHDRIFT_BIN or build archdrift-cli)");
        return;
    };

    let repo = workspace_root().join("tests").join("fixtures").join("repo_small");
    let data_dir = workspace_root().join("target").join("tmp").join("archdrift_doctor_smoke");
    let _ = std::fs::remove_dir_all(&data_dir);

    let output = Command::new(&bin)
        .arg("--json")
        .arg("--repo")
        .arg(&repo)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("doctor")
        .output()
        .expect("failed to spawn archdrift");
    assert!(output.status.success(), "archdrift doctor failed");

    let body = String::from_utf8(output.stdout).expect("non-utf8 stdout");
    for expected in ["module_map.json", "allowed_rules.json", "exceptions.json", "architecture config"] {
        assert!(body.contains(expected), "doctor output missing check for {expected:?}: {body}");
    }
}
