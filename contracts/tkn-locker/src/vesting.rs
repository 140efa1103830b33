use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

pub const DAY: u64 = 24 * 60 * 60;
pub const BPS_DENOMINATOR: u16 = 10_000;

#[cw_serde]
pub struct VestingSchedule {
    /// Seconds from distribution start until everything is unlocked
    pub duration: u64,
    /// Unlocks happen in whole steps of this many seconds
    pub release_interval: u64,
    /// Share unlocked immediately at distribution start
    pub tge_release_bps: u16,
}

impl Default for VestingSchedule {
    fn default() -> Self {
        VestingSchedule {
            duration: 90 * DAY,
            release_interval: DAY,
            tge_release_bps: 1_000,
        }
    }
}

/// Cumulative amount unlocked at `current_time` for a distribution that
/// began at `started_at`. Never exceeds `total_amount`.
pub fn calculate_unlocked_amount(
    schedule: &VestingSchedule,
    total_amount: Uint128,
    started_at: u64,
    current_time: u64,
) -> Uint128 {
    if current_time < started_at {
        return Uint128::zero();
    }

    let elapsed = current_time - started_at;
    if elapsed >= schedule.duration {
        return total_amount;
    }

    let tge_amount = total_amount.multiply_ratio(schedule.tge_release_bps, BPS_DENOMINATOR);
    let effective_elapsed = (elapsed / schedule.release_interval) * schedule.release_interval;

    // linear part is bounded by total_amount - tge_amount since effective_elapsed < duration
    let linear = (total_amount - tge_amount).multiply_ratio(effective_elapsed, schedule.duration);
    tge_amount + linear
}

pub fn validate_schedule(schedule: &VestingSchedule) -> Result<(), String> {
    if schedule.duration == 0 {
        return Err("duration must be > 0".to_string());
    }
    if schedule.release_interval == 0 {
        return Err("release_interval must be > 0".to_string());
    }
    if schedule.release_interval > schedule.duration {
        return Err("release_interval must be <= duration".to_string());
    }
    if schedule.tge_release_bps > BPS_DENOMINATOR {
        return Err(format!(
            "tge_release_bps ({}) must be <= {}",
            schedule.tge_release_bps, BPS_DENOMINATOR
        ));
    }
    Ok(())
}
