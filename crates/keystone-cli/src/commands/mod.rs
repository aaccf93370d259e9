pub mod kernel;
pub mod ledger;

use keystone_kernel::{InitializationReport, KernelConfig, Orchestrator};

use crate::error::CliResult;
use crate::output::OutputFormat;

pub struct Session {
    pub config: KernelConfig,
    pub entries: Vec<String>,
    pub format: OutputFormat,
}

impl Session {
    /// Fresh orchestrator with the session's entries recorded, not yet initialized.
    pub fn orchestrator(&self) -> CliResult<Orchestrator> {
        let mut orch = Orchestrator::new(self.config.clone())?;
        for entry in &self.entries {
            orch.append_entry(entry.as_bytes().to_vec())?;
        }
        Ok(orch)
    }

    /// Fresh orchestrator, initialized. Initialization failure is an error.
    pub fn boot(&self) -> CliResult<(Orchestrator, InitializationReport)> {
        let mut orch = self.orchestrator()?;
        let report = orch.initialize()?;
        Ok((orch, report))
    }
}
