use crate::error::{Result, SemaforoError};
use crate::types::config::SemaforoConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "semaforo.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".semaforo/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/semaforo/config.toml";

/// Loads the layered configuration for a working root: global user config,
/// then the root's `semaforo.toml`, then the local override file, each layer
/// deep-merged over the previous one. Returns `None` when the root carries no
/// config file at all.
pub fn load_config(root: &Path) -> Result<Option<SemaforoConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<SemaforoConfig>> {
    let root_path = root.join(DEFAULT_CONFIG_FILE);
    if !root_path.exists() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &root_path)?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: SemaforoConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| SemaforoError::ConfigParse(e.to_string()))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)?;
    let value: Value = toml::from_str(&content)
        .map_err(|e| SemaforoError::ConfigParse(format!("{}: {}", path.display(), e)))?;
    merge_toml(merged, value);
    Ok(())
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
