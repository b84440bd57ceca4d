//! YAML configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::ClientConfig;
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};

/// Default config filename.
pub const CONFIG_FILE_NAME: &str = "sfxdeck.yaml";

/// Finds and loads `sfxdeck.yaml`.
///
/// Supports searching multiple directories (e.g. system-wide + user). When
/// the file exists in several, later directories take priority.
pub struct ConfigLoader {
    config_dirs: Vec<PathBuf>,
    validator: ConfigValidator,
}

impl ConfigLoader {
    /// Creates a loader searching a single directory.
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self::new_with_dirs(vec![config_dir.as_ref().to_path_buf()])
    }

    /// Creates a loader searching several directories, later ones first.
    pub fn new_with_dirs(config_dirs: Vec<PathBuf>) -> Self {
        Self {
            config_dirs,
            validator: ConfigValidator::new(),
        }
    }

    /// Path of the config file that would be loaded, if any exists.
    pub fn find(&self) -> Option<PathBuf> {
        self.config_dirs
            .iter()
            .rev()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.exists())
    }

    /// Loads and validates the config. A missing file yields the defaults.
    pub fn load(&self) -> Result<ClientConfig> {
        match self.find() {
            Some(path) => self.load_file(&path),
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(ClientConfig::default())
            }
        }
    }

    /// Loads and validates a config from an explicit path. The file must exist.
    pub fn load_file(&self, path: &Path) -> Result<ClientConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigLoad(path.display().to_string(), e.to_string()))?;

        let mut config: ClientConfig = if content.trim().is_empty() {
            ClientConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::ConfigParse(path.display().to_string(), e.to_string()))?
        };

        self.validator.validate(&config).map_err(|e| match e {
            Error::ConfigValidation(field, message) => Error::ConfigValidation(
                path.display().to_string(),
                format!("{}: {}", field, message),
            ),
            other => other,
        })?;

        config.source_path = Some(path.to_path_buf());
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
