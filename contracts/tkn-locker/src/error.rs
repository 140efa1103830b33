use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] cosmwasm_std::OverflowError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Lockup window is closed")]
    LockupWindowClosed {},

    #[error("Lockup window cannot reopen after token distribution started")]
    LockupWindowCannotReopen {},

    #[error("Can't enable token distribution when lockup window is still open")]
    LockupWindowStillOpen {},

    #[error("Can't enable token distribution when it is already active")]
    DistributionAlreadyActive {},

    #[error("Cannot claim before token generation event")]
    DistributionNotStarted {},

    #[error("Not eligible to claim")]
    NotEligibleToClaim {},

    #[error("Amount cannot be less than {minimum}")]
    BelowMinimumLock { minimum: Uint128 },

    #[error("Amount must be greater than zero")]
    ZeroAmount {},

    #[error("Locker not found")]
    LockerNotFound {},

    #[error("Locker is cancelled")]
    LockerCancelled {},

    #[error("Locker already cancelled")]
    LockerAlreadyCancelled {},

    #[error("Locked token is not set")]
    TokenNotSet {},

    #[error("Received token is not the locked token")]
    InvalidToken {},

    #[error("Locked token cannot change once lockers exist")]
    TokenAlreadyInUse {},

    #[error("Invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("Unknown reply id: {0}")]
    UnknownReplyId(u64),

    #[error("Invalid migration")]
    InvalidMigration {},
}
