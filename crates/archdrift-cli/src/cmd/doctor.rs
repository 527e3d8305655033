use anyhow::Result;
use serde::Serialize;

use archdrift_core::config::EngineConfig;

use crate::args::Cli;
use crate::io::context::AppContext;
use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

pub async fn run(cli: &Cli) -> Result<()> {
    let mut checks = Vec::new();

    checks.push(Check {
        name: "git".to_string(),
        ok: which_ok("git"),
        detail: "required to read commit blobs for `analyze`".to_string(),
    });

    match AppContext::resolve(cli) {
        Ok(ctx) => {
            checks.push(config_file_check(&ctx, "module_map.json"));
            checks.push(config_file_check(&ctx, "allowed_rules.json"));
            checks.push(config_file_check(&ctx, "exceptions.json"));

            match ctx.load_config() {
                Ok(_) => checks.push(Check {
                    name: "architecture config".to_string(),
                    ok: true,
                    detail: format!("loaded and cross-validated from {}", ctx.config_dir.display()),
                }),
                Err(err) => checks.push(Check {
                    name: "architecture config".to_string(),
                    ok: false,
                    detail: format!("{err}"),
                }),
            }

            let baseline_dir = ctx.baseline_dir();
            checks.push(Check {
                name: "baseline".to_string(),
                ok: archdrift_store::baseline::exists(&baseline_dir),
                detail: format!("expected at {}", baseline_dir.display()),
            });
        }
        Err(err) => checks.push(Check {
            name: "repo root".to_string(),
            ok: false,
            detail: format!("{err:#}"),
        }),
    }

    let limits = EngineConfig::default();
    checks.push(Check {
        name: "limits".to_string(),
        ok: true,
        detail: format!(
            "max_files={} max_file_bytes={} max_changed_files={} max_cycles={}",
            limits.graph_limits.max_files,
            limits.graph_limits.max_file_bytes,
            limits.delta_limits.max_changed_files,
            limits.cycle_limits.max_cycles,
        ),
    });

    let ok = checks.iter().all(|c| c.ok);
    if output::is_json() {
        output::print_json(&DoctorOut { ok, checks })?;
    } else {
        for check in &checks {
            output::print_line(&format!("[{}] {}: {}", if check.ok { "ok" } else { "FAIL" }, check.name, check.detail));
        }
    }
    Ok(())
}

fn config_file_check(ctx: &AppContext, file_name: &str) -> Check {
    let path = ctx.config_dir.join(file_name);
    let ok = path.is_file();
    Check {
        name: file_name.to_string(),
        ok,
        detail: format!("expected at {}", path.display()),
    }
}

fn which_ok(cmd: &str) -> bool {
    std::env::var_os("PATH")
        .and_then(|paths| {
            for p in std::env::split_paths(&paths) {
                let full = p.join(cmd);
                if full.exists() {
                    return Some(());
                }
                #[cfg(windows)]
                {
                    let full_exe = p.join(format!("{cmd}.exe"));
                    if full_exe.exists() {
                        return Some(());
                    }
                }
            }
            None
        })
        .is_some()
}
