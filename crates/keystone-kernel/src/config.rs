use keystone_capability::CapabilityFlag;
use keystone_constraint::ConstraintResolver;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kernel configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Stamped into every ledger timestamp.
    pub node_id: u16,
    /// Flags activated by steps 7 and 8, in that order.
    pub gating_flags: [CapabilityFlag; 2],
    /// Percentages the audit pushes through a value round trip.
    pub round_trip_samples: Vec<f64>,
    /// Command receipts retained; oldest are dropped first.
    pub max_command_log: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            gating_flags: [
                CapabilityFlag::CoreGovernance,
                CapabilityFlag::IntegrityEnforcement,
            ],
            round_trip_samples: vec![0.0, 0.5, 1.0, 12.5, 25.0, 29.0, 50.0, 75.0, 99.9, 100.0],
            max_command_log: 1024,
        }
    }
}

impl KernelConfig {
    /// Audits every whole percentage and keeps a shorter command log.
    pub fn strict() -> Self {
        Self {
            round_trip_samples: (0..=100).map(f64::from).collect(),
            max_command_log: 256,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_trip_samples.is_empty() {
            return Err(ConfigError::NoSamples);
        }
        if let Some(bad) = self
            .round_trip_samples
            .iter()
            .find(|p| !p.is_finite() || !(0.0..=100.0).contains(*p))
        {
            return Err(ConfigError::SampleOutOfRange(*bad));
        }
        let resolver = ConstraintResolver::new();
        for &sample in &self.round_trip_samples {
            let returned = resolver
                .percentage_to_value(sample)
                .and_then(|value| resolver.value_to_percentage(value))
                .map_err(|_| ConfigError::SampleOutOfRange(sample))?;
            if returned != sample {
                return Err(ConfigError::SampleNotRepresentable { sample, returned });
            }
        }
        if self.gating_flags[0] == self.gating_flags[1] {
            return Err(ConfigError::DuplicateGatingFlag(
                self.gating_flags[0].to_string(),
            ));
        }
        if self.max_command_log == 0 {
            return Err(ConfigError::ZeroCommandLog);
        }
        Ok(())
    }
}
