//! Runtime configuration, loaded from TOML.
//!
//! ```toml
//! [engine]
//! failed_fee_policy = "record_only"
//!
//! [engine.fees]
//! transfer = 100000
//!
//! [filter]
//! tps = 2000
//! cycle_secs = 86400
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledger_engine::EngineConfig;

use crate::duplicate_filter::{DuplicateFilterConfig, FilterConfigError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid filter sizing: {0}")]
    Invalid(#[from] FilterConfigError),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub filter: DuplicateFilterConfig,
}

impl RuntimeConfig {
    /// Parse and check the filter sizing, so a config that loads can
    /// always build its duplicate filter.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.filter.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
