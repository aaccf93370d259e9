use chrono::{DateTime, Utc};
use keystone_capability::CapabilityFlag;
use keystone_ledger::{LedgerState, SealCertificate};
use keystone_types::ContentHash;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orchestrator::OrchestratorState;
use crate::step::InitializationStep;

/// Returned by a successful [`Orchestrator::initialize`](crate::Orchestrator::initialize).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitializationReport {
    pub orchestrator_id: Uuid,
    pub completed_steps: Vec<InitializationStep>,
    pub certificate: SealCertificate,
    pub capability_level: u32,
    pub activated_flags: Vec<CapabilityFlag>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub percentage: f64,
    pub value: f64,
}

/// Audit record of one executed command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReceipt {
    pub id: Uuid,
    pub sequence: u64,
    pub command: String,
    pub digest: ContentHash,
    pub capability_level: u32,
    pub ledger_state: LedgerState,
    pub executed_at: DateTime<Utc>,
}

/// Point-in-time view across all three components.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub orchestrator_id: Uuid,
    pub state: OrchestratorState,
    pub node_id: u16,
    pub unbounded_resolved: bool,
    pub constraint_span: f64,
    pub ledger_state: LedgerState,
    pub ledger_blocks: usize,
    pub head_hash: ContentHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal_hash: Option<ContentHash>,
    pub capability_level: u32,
    pub capabilities: Vec<CapabilityFlag>,
    pub activated: Vec<CapabilityFlag>,
    pub commands_executed: u64,
    pub generated_at: DateTime<Utc>,
}
