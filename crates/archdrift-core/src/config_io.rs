//! Architecture configuration loader: reads and merges the three
//! on-disk config files into one [`ArchitectureConfig`].
//!
//! Grounded on `original_source/backend/utils/architecture_config.py`:
//! `module_map.json` / `allowed_rules.json` / `exceptions.json` are each
//! parsed independently, merged into one record, then cross-validated.
//! `serde`'s field-presence and type checking stands in for the original's
//! hand-rolled key-by-key validation; [`ArchitectureConfig::validate`]
//! still performs the cross-file module-id checks the original runs last.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{ArchDriftError, ArchDriftResult};
use crate::model::{ArchitectureConfig, ConfigException, Edge, Module};

const MODULE_MAP_FILE: &str = "module_map.json";
const ALLOWED_RULES_FILE: &str = "allowed_rules.json";
const EXCEPTIONS_FILE: &str = "exceptions.json";

#[derive(Debug, Deserialize)]
struct ModuleMapFile {
    version: String,
    unmapped_module_id: String,
    modules: Vec<Module>,
}

#[derive(Debug, Deserialize)]
struct AllowedRulesFile {
    deny_by_default: bool,
    allowed_edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct ExceptionsFile {
    exceptions: Vec<ConfigException>,
}

fn read_config_json<T: serde::de::DeserializeOwned>(
    config_dir: &Path,
    file_name: &str,
) -> ArchDriftResult<T> {
    let path = config_dir.join(file_name);
    let bytes = fs::read(&path).map_err(|_| {
        ArchDriftError::invalid_config(format!(
            "missing configuration file {file_name:?} at expected path {}",
            path.display()
        ))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ArchDriftError::json(path.display().to_string(), e))
}

/// `load_architecture_config(config_dir)`: read `module_map.json`,
/// `allowed_rules.json`, and `exceptions.json`, merge into one
/// [`ArchitectureConfig`], and cross-validate module id references.
pub fn load_architecture_config(config_dir: &Path) -> ArchDriftResult<ArchitectureConfig> {
    let module_map: ModuleMapFile = read_config_json(config_dir, MODULE_MAP_FILE)?;
    let allowed_rules: AllowedRulesFile = read_config_json(config_dir, ALLOWED_RULES_FILE)?;
    let exceptions: ExceptionsFile = read_config_json(config_dir, EXCEPTIONS_FILE)?;

    let config = ArchitectureConfig {
        version: module_map.version,
        unmapped_module_id: module_map.unmapped_module_id,
        modules: module_map.modules,
        deny_by_default: allowed_rules.deny_by_default,
        allowed_edges: allowed_rules.allowed_edges,
        exceptions: exceptions.exceptions,
    };
    config.validate()?;
    Ok(config)
}
