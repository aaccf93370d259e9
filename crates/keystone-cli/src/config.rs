//! Kernel configuration loading

use std::path::Path;

use keystone_kernel::KernelConfig;

use crate::error::{CliError, CliResult};

/// Read a TOML kernel config. A missing file, or no path at all, gives the
/// defaults; a present file must parse and validate.
pub fn load(path: Option<&Path>) -> CliResult<KernelConfig> {
    let config = match path {
        Some(path) if path.exists() => {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?
        }
        Some(path) => {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            KernelConfig::default()
        }
        None => KernelConfig::default(),
    };

    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config)
}
