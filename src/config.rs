//! TOML deployment configuration.
//!
//! Deploy configs can be loaded from TOML files, allowing different
//! principals per network. The format mirrors [`DeployConfig`] with
//! hex-encoded addresses.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contract::DeployConfig;
use crate::types::{Address, AddressError};

/// TOML-serializable deploy config
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployConfigToml {
    /// Forwarding destination (hex address)
    pub receiver: String,
    /// Lock/unlock principal (hex address)
    pub admin: String,
}

/// Config loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File read/write failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML syntax or shape failure
    #[error("parse error: {0}")]
    Parse(String),
    /// An address field did not parse
    #[error("bad address in config: {0}")]
    Address(#[from] AddressError),
}

impl DeployConfigToml {
    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the addresses and build a [`DeployConfig`]
    pub fn to_deploy_config(&self) -> Result<DeployConfig, ConfigError> {
        Ok(DeployConfig {
            receiver: Address::from_hex(&self.receiver)?,
            admin: Address::from_hex(&self.admin)?,
        })
    }

    /// Render a [`DeployConfig`] back to the TOML shape
    #[must_use]
    pub fn from_deploy_config(config: &DeployConfig) -> Self {
        Self {
            receiver: config.receiver.to_hex(),
            admin: config.admin.to_hex(),
        }
    }
}
