use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, OverflowError, Uint128};
use cw_storage_plus::{Item, Map};

use crate::phase::Phase;
use crate::vesting::VestingSchedule;

/// Whole tokens a first lock must reach, scaled by `token_decimals`
pub const MIN_LOCK_TOKENS: u128 = 15_000;

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    pub token: Option<Addr>,
    pub token_decimals: u8,
    pub vesting: VestingSchedule,
}

impl Config {
    pub fn min_lock_amount(&self) -> Result<Uint128, OverflowError> {
        let scale = Uint128::new(10).checked_pow(self.token_decimals as u32)?;
        Uint128::new(MIN_LOCK_TOKENS).checked_mul(scale)
    }
}

#[cw_serde]
pub struct State {
    pub phase: Phase,
    pub total_lockers: u64,
    pub total_locked: Uint128,
    pub total_claimed: Uint128,
}

#[cw_serde]
pub enum LockerState {
    Locked,
    Cancelled,
}

#[cw_serde]
pub struct Locker {
    pub locker_id: u64,
    pub token: Addr,
    pub owner: Addr,
    pub state: LockerState,
    pub amount: Uint128,
    pub tokens_claimed: Uint128,
    pub locked_at: u64,
}

impl Locker {
    pub fn is_locked(&self) -> bool {
        self.state == LockerState::Locked
    }

    pub fn remaining(&self) -> Uint128 {
        self.amount.saturating_sub(self.tokens_claimed)
    }
}

/// Lock in flight between the allowance pull and its reply
#[cw_serde]
pub struct PendingLock {
    pub owner: Addr,
    pub balance_before: Uint128,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const STATE: Item<State> = Item::new("state");
pub const LOCKERS: Map<u64, Locker> = Map::new("lockers");
// Owner -> locker id
pub const OWNER_LOCKERS: Map<&Addr, u64> = Map::new("owner_lockers");
pub const PENDING_LOCK: Item<PendingLock> = Item::new("pending_lock");
