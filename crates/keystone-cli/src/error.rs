//! CLI error types

use keystone_kernel::OrchestratorError;
use keystone_ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Kernel(#[from] OrchestratorError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type CliResult<T> = Result<T, CliError>;
