//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] on top of a single pretty-printed JSON file.
//! Missing fields fall back to their defaults, so a file only needs the
//! values it overrides.  Configs are validated on load and before save;
//! invalid values are rejected, not clamped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SimConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SimConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "JsonConfigFile: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(SimConfig::default());
            }
            Err(e) => {
                warn!("JsonConfigFile: read {} failed: {e}", self.path.display());
                return Err(ConfigError::IoError);
            }
        };
        let cfg: SimConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("JsonConfigFile: {} is not valid config: {e}", self.path.display());
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("JsonConfigFile: loaded config from {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|_| ConfigError::IoError)?;
        }
        fs::write(&self.path, text).map_err(|_| ConfigError::IoError)?;
        info!("JsonConfigFile: config saved to {}", self.path.display());
        Ok(())
    }
}
