//! Configuration loader.
//!
//! Discovers YAML files, detects the runtime environment, and merges the
//! environment overlay over the base document before deserializing into
//! [`WristpassConfig`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value as YamlValue;
use tracing::debug;

use super::WristpassConfig;
use crate::error::{Result, WristpassError};

/// Loaded configuration plus the context it was resolved from.
pub struct ConfigManager {
    config: WristpassConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection.
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory.
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<Arc<ConfigManager>> {
        let environment = crate::logging::environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with an explicit
    /// environment, useful in tests that must not mutate process env vars.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "loading configuration"
        );

        let mut config = Self::load_and_merge(&config_directory, environment)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;

        // Log the effective configuration with secrets redacted.
        let mut sanitized = config.clone();
        sanitized.database.password = "[redacted]".to_string();
        debug!(
            config = %serde_json::to_string(&sanitized).unwrap_or_default(),
            "configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    pub fn config(&self) -> &WristpassConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn load_and_merge(directory: &Path, environment: &str) -> Result<WristpassConfig> {
        let base_path = directory.join("wristpass.yaml");
        let base = Self::read_yaml(&base_path)?;

        let overlay_path = directory.join(format!("wristpass.{environment}.yaml"));
        let merged = if overlay_path.exists() {
            let overlay = Self::read_yaml(&overlay_path)?;
            Self::merge_values(base, overlay)
        } else {
            base
        };

        serde_yaml::from_value(merged).map_err(|e| {
            WristpassError::Configuration(format!(
                "invalid configuration in {}: {e}",
                directory.display()
            ))
        })
    }

    fn read_yaml(path: &Path) -> Result<YamlValue> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WristpassError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            WristpassError::Configuration(format!("malformed YAML in {}: {e}", path.display()))
        })
    }

    /// Recursive merge: overlay mappings win key-by-key, scalars replace.
    fn merge_values(base: YamlValue, overlay: YamlValue) -> YamlValue {
        match (base, overlay) {
            (YamlValue::Mapping(mut base_map), YamlValue::Mapping(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    let merged = match base_map.remove(&key) {
                        Some(base_value) => Self::merge_values(base_value, overlay_value),
                        None => overlay_value,
                    };
                    base_map.insert(key, merged);
                }
                YamlValue::Mapping(base_map)
            }
            (_, overlay) => overlay,
        }
    }

    /// Secrets come from the process environment, never from YAML on disk.
    fn apply_env_overrides(config: &mut WristpassConfig) {
        if let Ok(password) = std::env::var("WRISTPASS_DATABASE_PASSWORD") {
            config.database.password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> YamlValue {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn overlay_scalars_replace_base() {
        let base = yaml("database:\n  host: localhost\n  pool: 10\n");
        let overlay = yaml("database:\n  pool: 2\n");
        let merged = ConfigManager::merge_values(base, overlay);
        let database = merged.get("database").unwrap();
        assert_eq!(database.get("pool").unwrap().as_u64(), Some(2));
        assert_eq!(
            database.get("host").unwrap().as_str(),
            Some("localhost"),
            "untouched keys survive the merge"
        );
    }

    #[test]
    fn overlay_can_add_new_sections() {
        let base = yaml("database:\n  host: localhost\n");
        let overlay = yaml("payment:\n  expected_currency: eur\n");
        let merged = ConfigManager::merge_values(base, overlay);
        assert!(merged.get("payment").is_some());
        assert!(merged.get("database").is_some());
    }
}
