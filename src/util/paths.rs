//! Where settings and logs live.
//!
//! The config directory is, in order: the `--config` override, the
//! `DLM_LIVE_CONFIG_DIR` environment variable, `./config` when it exists, and
//! finally `dlm-live` under the platform config directory. Nothing is created
//! here; writers create the directories they need.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::RwLock;

pub const CONFIG_DIR_ENV: &str = "DLM_LIVE_CONFIG_DIR";
const APP_DIR_NAME: &str = "dlm-live";
const SETTINGS_FILE: &str = "settings.toml";
const LOGS_DIR: &str = ".logs";

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Pin the config directory (used by `--config` and tests)
pub fn set_config_dir_override(path: Option<PathBuf>) {
    *CONFIG_DIR_OVERRIDE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = path;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Resolve the config directory
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Ok(dir);
    }

    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let local = std::env::current_dir()
        .map(|cwd| cwd.join("config"))
        .ok()
        .filter(|dir| dir.is_dir());
    if let Some(dir) = local {
        tracing::debug!("Using local config directory {:?}", dir);
        return Ok(dir);
    }

    dirs::config_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .context("Could not determine user config directory")
}

/// `settings.toml` inside the config directory
pub fn get_app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Log directory inside the config directory
pub fn get_logs_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join(LOGS_DIR))
}
