use cosmwasm_schema::cw_serde;

use crate::error::ContractError;

/// Global phase of the locker.
///
/// Enrollment and distribution are variants of one enum, so the lockup
/// window can never be open while tokens are being distributed.
#[cw_serde]
pub enum Phase {
    /// Window closed, distribution not started
    Closed,
    /// Lockup window open, `Lock` accepted
    Enrollment,
    /// Vesting clock running from `started_at`
    Distribution { started_at: u64 },
}

impl Phase {
    pub fn lockup_window(&self) -> bool {
        matches!(self, Phase::Enrollment)
    }

    pub fn token_distribution_started(&self) -> bool {
        matches!(self, Phase::Distribution { .. })
    }

    pub fn distribution_started_at(&self) -> Option<u64> {
        match self {
            Phase::Distribution { started_at } => Some(*started_at),
            _ => None,
        }
    }

    pub fn enable_lockup_window(&self) -> Result<Phase, ContractError> {
        match self {
            Phase::Closed | Phase::Enrollment => Ok(Phase::Enrollment),
            Phase::Distribution { .. } => Err(ContractError::LockupWindowCannotReopen {}),
        }
    }

    pub fn disable_lockup_window(&self) -> Phase {
        match self {
            Phase::Enrollment => Phase::Closed,
            other => other.clone(),
        }
    }

    pub fn enable_token_distribution(&self, now: u64) -> Result<Phase, ContractError> {
        match self {
            Phase::Closed => Ok(Phase::Distribution { started_at: now }),
            Phase::Enrollment => Err(ContractError::LockupWindowStillOpen {}),
            Phase::Distribution { .. } => Err(ContractError::DistributionAlreadyActive {}),
        }
    }
}
