use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};
use cw20::Cw20ReceiveMsg;

use crate::state::LockerState;
use crate::vesting::VestingSchedule;

#[cw_serde]
pub struct InstantiateMsg {
    pub admin: String,
    /// Token to lock, may be set later through `UpdateToken`
    pub token: Option<String>,
    pub token_decimals: u8,
    /// Defaults to 90 daily releases with 10% at token generation
    pub vesting: Option<VestingSchedule>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Receive CW20 tokens pushed with `Send`
    Receive(Cw20ReceiveMsg),

    /// Lock tokens pulled from the caller's allowance
    Lock { amount: Uint128 },

    /// Cancel the caller's locker and refund everything not yet claimed
    UnlockAndCancel {},

    /// Claim the vested part of the caller's locker
    Withdraw {},

    /// Admin: open enrollment
    EnableLockupWindow {},

    /// Admin: close enrollment
    DisableLockupWindow {},

    /// Admin: start the vesting clock
    EnableTokenDistribution {},

    /// Admin: set the locked token
    UpdateToken { token: String },

    /// Admin: replace the vesting schedule before distribution
    UpdateVestingSchedule { schedule: VestingSchedule },

    /// Admin: transfer ownership
    UpdateAdmin { admin: String },
}

#[cw_serde]
pub enum Cw20HookMsg {
    Lock {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(StatusResponse)]
    Status {},

    #[returns(LockerResponse)]
    LockerInfo { locker_id: u64 },

    #[returns(Option<LockerResponse>)]
    LockerByOwner { owner: String },

    #[returns(LockersResponse)]
    Lockers {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(ClaimableAmountResponse)]
    ClaimableAmount { owner: String },
}

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub token: Option<Addr>,
    pub token_decimals: u8,
    pub min_lock_amount: Uint128,
    pub vesting: VestingSchedule,
}

#[cw_serde]
pub struct StatusResponse {
    pub lockup_window: bool,
    pub token_distribution_started: bool,
    pub distribution_started_at: Option<u64>,
    pub total_lockers: u64,
    pub total_locked: Uint128,
    pub total_claimed: Uint128,
}

#[cw_serde]
pub struct LockerResponse {
    pub locker_id: u64,
    pub token: Addr,
    pub owner: Addr,
    pub state: LockerState,
    pub amount: Uint128,
    pub tokens_claimed: Uint128,
    pub locked_at: u64,
    pub claimable_amount: Uint128,
}

#[cw_serde]
pub struct LockersResponse {
    pub lockers: Vec<LockerResponse>,
}

#[cw_serde]
pub struct ClaimableAmountResponse {
    pub unlocked_amount: Uint128,
    pub claimable_amount: Uint128,
}

#[cw_serde]
pub struct MigrateMsg {}
