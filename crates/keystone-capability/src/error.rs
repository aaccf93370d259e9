use thiserror::Error;

use crate::flags::CapabilityFlag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("capability {flag} is not available at the current escalation level")]
    NotAvailable { flag: CapabilityFlag },

    #[error("capability registry already initialized")]
    AlreadyInitialized,

    #[error("capability registry not initialized")]
    NotInitialized,

    #[error("capability level {level} is the ceiling")]
    LevelCeiling { level: u32 },
}
