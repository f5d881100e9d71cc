use crate::models::VisualizerConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// Name of the YAML file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "Sorting Visualizer.yaml";

/// Prefix for environment overrides (`SORTVIZ_STEP_DELAY_MS=5`)
pub const ENV_PREFIX: &str = "SORTVIZ";

/// Loads and saves `Sorting Visualizer.yaml`.
///
/// Values are layered: built-in defaults, then the YAML file, then
/// `SORTVIZ_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the configuration file (e.g., "config")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the visualizer configuration.
    ///
    /// A missing file is not an error; defaults and environment overrides
    /// still apply.
    ///
    /// # Errors
    /// Fails when the file cannot be parsed or the merged values are invalid.
    pub fn load_config(&self) -> Result<VisualizerConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let config: VisualizerConfig = Config::builder()
            .add_source(
                File::from(self.config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the visualizer configuration.
    ///
    /// # Arguments
    /// * `config` - The VisualizerConfig to save
    pub fn save_config(&self, config: &VisualizerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_create_config_manager_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = Utf8PathBuf::try_from(temp_dir.path().join("a").join("b")).unwrap();

        let manager = ConfigManager::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(manager.config_path(), nested.join(CONFIG_FILE_NAME).as_path());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.array_len, VisualizerConfig::default().array_len);
        assert_eq!(loaded.min_value, VisualizerConfig::default().min_value);
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = VisualizerConfig {
            array_len: 12,
            step_delay_ms: 5,
            ..VisualizerConfig::default()
        };
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.array_len, 12);
        assert_eq!(loaded.step_delay_ms, 5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "max_value: 100\n").unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.max_value, 100);
        assert_eq!(loaded.min_value, VisualizerConfig::default().min_value);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "min_value: 50\nmax_value: 50\n").unwrap();

        let err = manager.load_config().unwrap_err();
        assert!(format!("{:#}", err).contains("value range 50..50 is empty"));
    }
}
