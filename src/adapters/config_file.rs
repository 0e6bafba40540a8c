//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  A missing file
//! means first boot and yields the defaults; a file that does not parse is
//! [`ConfigError::Corrupted`]; a file that parses is always validated.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::GreenhouseConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<GreenhouseConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(GreenhouseConfig::default());
            }
            Err(e) => return Err(ConfigError::IoError(e.kind())),
        };

        let cfg: GreenhouseConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {} does not parse: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("Config: loaded {}", self.path.display());
        Ok(cfg)
    }
}
