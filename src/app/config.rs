use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration (saved to config/settings.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub poll: PollConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Saved theme preference: "light", "dark", or empty for none
    #[serde(default)]
    pub theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub endpoint: String,
    pub interval_ms: u64,
    /// Drop batches that arrive after a newer one was applied
    #[serde(default)]
    pub discard_stale_ticks: bool,
    /// No timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show times in UTC instead of local time
    #[serde(default)]
    pub utc_times: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                theme: String::new(),
            },
            poll: PollConfig {
                endpoint: "http://localhost:8080/downloads/progress".to_string(),
                interval_ms: 1000,
                discard_stale_ticks: false,
                request_timeout_secs: None,
            },
            network: NetworkConfig {
                user_agent: concat!("dlm-live/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config directory
    pub fn load() -> anyhow::Result<Self> {
        let config_path = crate::util::paths::get_app_config_path()?;
        let config = Self::load_from(&config_path)?;

        if let Err(errors) = crate::app::settings::validate_config(&config) {
            return Err(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        if let Err(errors) = crate::app::settings::validate_config(self) {
            return Err(anyhow::anyhow!(
                "Cannot save invalid config: {}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        let config_path = crate::util::paths::get_app_config_path()?;
        self.save_to(&config_path)?;

        tracing::info!("Saved application config to {:?}", config_path);
        Ok(())
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read {:?}", path))?;
            toml::from_str(&content).context(format!("Failed to parse {:?}", path))
        } else {
            tracing::info!("Application config not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Write a config file atomically (temp file + rename)
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;

        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content)
            .context("Failed to write temp config file")?;
        std::fs::rename(&temp_path, path)
            .context("Failed to rename temp config file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    fn create_test_config_toml() -> &'static str {
        r#"
[general]
theme = "dark"

[poll]
endpoint = "https://dlm.example.com/downloads/progress"
interval_ms = 2500
discard_stale_ticks = true
request_timeout_secs = 10

[network]
user_agent = "CustomAgent/1.0"

[display]
utc_times = true
"#
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.general.theme, "");
        assert_eq!(config.poll.endpoint, "http://localhost:8080/downloads/progress");
        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.poll.discard_stale_ticks, false);
        assert_eq!(config.poll.request_timeout_secs, None);
        assert!(config.network.user_agent.starts_with("dlm-live/"));
        assert_eq!(config.display.utc_times, false);
    }

    #[test]
    fn test_config_load_missing_file_uses_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();

        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.general.theme, "");
    }

    #[test]
    fn test_config_load_valid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        std::fs::write(&config_path, create_test_config_toml()).unwrap();

        let config = Config::load_from(&config_path).unwrap();

        assert_eq!(config.general.theme, "dark");
        assert_eq!(config.poll.endpoint, "https://dlm.example.com/downloads/progress");
        assert_eq!(config.poll.interval_ms, 2500);
        assert_eq!(config.poll.discard_stale_ticks, true);
        assert_eq!(config.poll.request_timeout_secs, Some(10));
        assert_eq!(config.network.user_agent, "CustomAgent/1.0");
        assert_eq!(config.display.utc_times, true);
    }

    #[test]
    fn test_config_optional_sections_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        std::fs::write(
            &config_path,
            r#"
[general]

[poll]
endpoint = "http://localhost/p"
interval_ms = 500

[network]
user_agent = "ua"
"#,
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.general.theme, "");
        assert_eq!(config.poll.discard_stale_ticks, false);
        assert_eq!(config.display.utc_times, false);
    }

    #[test]
    fn test_config_load_invalid_toml_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        std::fs::write(&config_path, "this is not valid toml [[[").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut config = Config::default();
        config.general.theme = "light".to_string();
        config.poll.interval_ms = 750;
        config.poll.request_timeout_secs = Some(3);

        config.save_to(&config_path).unwrap();
        assert!(config_path.exists());
        assert!(!config_path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded.general.theme, "light");
        assert_eq!(loaded.poll.interval_ms, 750);
        assert_eq!(loaded.poll.request_timeout_secs, Some(3));
    }

    #[test]
    #[serial]
    fn test_save_and_load_through_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        crate::util::paths::set_config_dir_override(Some(temp_dir.path().to_path_buf()));

        let mut config = Config::default();
        config.general.theme = "dark".to_string();
        config.save().unwrap();

        let loaded = Config::load().unwrap();

        crate::util::paths::set_config_dir_override(None);

        assert_eq!(loaded.general.theme, "dark");
        assert!(temp_dir.path().join("settings.toml").exists());
    }

    #[test]
    #[serial]
    fn test_save_rejects_invalid_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        crate::util::paths::set_config_dir_override(Some(temp_dir.path().to_path_buf()));

        let mut config = Config::default();
        config.poll.interval_ms = 0;
        let result = config.save();

        crate::util::paths::set_config_dir_override(None);

        assert!(result.is_err());
        assert!(!temp_dir.path().join("settings.toml").exists());
    }
}
