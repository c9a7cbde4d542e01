//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use kindred_core::passcode::DEFAULT_PASSCODE_COST;
use kindred_core::TreeId;
use kindred_server::config::DEFAULT_BIND;
use serde::{Deserialize, Serialize};

/// bcrypt accepts work factors in this range
const PASSCODE_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kindred")
}

/// Get default config file location
pub fn config_file_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_tree: Option<TreeId>,
    pub bind: String,
    pub passcode_cost: u32,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_tree: None,
            bind: DEFAULT_BIND.to_string(),
            passcode_cost: DEFAULT_PASSCODE_COST,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "data_dir",
            "default_tree",
            "bind",
            "passcode_cost",
            "cors_origins",
        ]
    }

    /// Value of `key` as text; `Ok(None)` when the key is unset
    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "default_tree" => self.default_tree.map(|t| t.to_string()),
            "bind" => Some(self.bind.clone()),
            "passcode_cost" => Some(self.passcode_cost.to_string()),
            "cors_origins" if self.cors_origins.is_empty() => None,
            "cors_origins" => Some(self.cors_origins.join(",")),
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        };
        Ok(value)
    }

    /// Set `key` from text; an empty value clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            "data_dir" => {
                if value.is_empty() {
                    anyhow::bail!("data_dir cannot be empty");
                }
                self.data_dir = PathBuf::from(value);
            }
            "default_tree" => {
                self.default_tree = if value.is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse::<TreeId>()
                            .with_context(|| format!("Invalid tree id: {}", value))?,
                    )
                };
            }
            "bind" => {
                if value.is_empty() {
                    anyhow::bail!("bind cannot be empty");
                }
                self.bind = value.to_string();
            }
            "passcode_cost" => {
                let cost: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid passcode cost: {}", value))?;
                if !PASSCODE_COST_RANGE.contains(&cost) {
                    anyhow::bail!(
                        "passcode_cost must be between {} and {}",
                        PASSCODE_COST_RANGE.start(),
                        PASSCODE_COST_RANGE.end()
                    );
                }
                self.passcode_cost = cost;
            }
            "cors_origins" => {
                self.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("default_tree", "7").unwrap();
        config.set("passcode_cost", "4").unwrap();
        config.set("cors_origins", "http://a.test, http://b.test").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.default_tree, Some(TreeId(7)));
        assert_eq!(loaded.passcode_cost, 4);
        assert_eq!(loaded.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "passcode_cost = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.passcode_cost, 5);
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        assert_eq!(config.get("default_tree").unwrap(), None);
        assert!(config.get("nope").is_err());

        config.set("default_tree", "3").unwrap();
        assert_eq!(config.get("default_tree").unwrap().as_deref(), Some("3"));
        config.set("default_tree", "").unwrap();
        assert_eq!(config.default_tree, None);

        assert!(config.set("passcode_cost", "2").is_err());
        assert!(config.set("default_tree", "abc").is_err());
        assert!(config.set("nope", "1").is_err());
    }
}
