#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order, Reply,
    Response, StdResult, SubMsg, Uint128, WasmMsg,
};
use cw2::{get_contract_version, set_contract_version};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Cw20ReceiveMsg};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::msg::{
    ClaimableAmountResponse, ConfigResponse, Cw20HookMsg, ExecuteMsg, InstantiateMsg,
    LockerResponse, LockersResponse, MigrateMsg, QueryMsg, StatusResponse,
};
use crate::phase::Phase;
use crate::state::{
    Config, Locker, LockerState, PendingLock, State, CONFIG, LOCKERS, OWNER_LOCKERS,
    PENDING_LOCK, STATE,
};
use crate::vesting::{calculate_unlocked_amount, validate_schedule, VestingSchedule};

const CONTRACT_NAME: &str = "crates.io:tkn-locker";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LOCK_REPLY_ID: u64 = 1;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let token = msg
        .token
        .as_ref()
        .map(|token| deps.api.addr_validate(token))
        .transpose()?;

    let vesting = msg.vesting.unwrap_or_default();
    validate_schedule(&vesting).map_err(|e| ContractError::InvalidSchedule { reason: e })?;

    let config = Config {
        admin,
        token,
        token_decimals: msg.token_decimals,
        vesting,
    };
    // Rejects decimals that would overflow the minimum lock
    let min_lock_amount = config.min_lock_amount()?;
    CONFIG.save(deps.storage, &config)?;

    STATE.save(
        deps.storage,
        &State {
            phase: Phase::Closed,
            total_lockers: 0,
            total_locked: Uint128::zero(),
            total_claimed: Uint128::zero(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", msg.admin)
        .add_attribute("min_lock_amount", min_lock_amount))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Receive(msg) => receive_cw20(deps, env, info, msg),
        ExecuteMsg::Lock { amount } => execute_lock(deps, env, info, amount),
        ExecuteMsg::UnlockAndCancel {} => execute_unlock_and_cancel(deps, info),
        ExecuteMsg::Withdraw {} => execute_withdraw(deps, env, info),
        ExecuteMsg::EnableLockupWindow {} => execute_enable_lockup_window(deps, info),
        ExecuteMsg::DisableLockupWindow {} => execute_disable_lockup_window(deps, info),
        ExecuteMsg::EnableTokenDistribution {} => {
            execute_enable_token_distribution(deps, env, info)
        }
        ExecuteMsg::UpdateToken { token } => execute_update_token(deps, info, token),
        ExecuteMsg::UpdateVestingSchedule { schedule } => {
            execute_update_vesting_schedule(deps, info, schedule)
        }
        ExecuteMsg::UpdateAdmin { admin } => execute_update_admin(deps, info, admin),
    }
}

pub fn receive_cw20(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    wrapper: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let token = config.token.clone().ok_or(ContractError::TokenNotSet {})?;
    if info.sender != token {
        return Err(ContractError::InvalidToken {});
    }

    let owner = deps.api.addr_validate(&wrapper.sender)?;
    let hook_msg: Cw20HookMsg = from_json(&wrapper.msg)?;

    match hook_msg {
        Cw20HookMsg::Lock {} => {
            let token = lockable_token(deps.as_ref(), &config, &owner)?;

            // Funds already moved, so anything held beyond what lockers own has just arrived
            let state = STATE.load(deps.storage)?;
            let unaccounted = query_custody(deps.as_ref(), &env, &token)?
                .saturating_sub(state.total_locked);
            let delivered = wrapper.amount.min(unaccounted);

            credit_lock(deps, &env, &config, token, &owner, delivered)
        }
    }
}

pub fn execute_lock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let token = lockable_token(deps.as_ref(), &config, &info.sender)?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount {});
    }

    let balance_before = query_custody(deps.as_ref(), &env, &token)?;
    PENDING_LOCK.save(
        deps.storage,
        &PendingLock {
            owner: info.sender.clone(),
            balance_before,
        },
    )?;

    let pull_msg = WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
            owner: info.sender.to_string(),
            recipient: env.contract.address.to_string(),
            amount,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(pull_msg, LOCK_REPLY_ID))
        .add_attribute("action", "lock_pull")
        .add_attribute("owner", info.sender)
        .add_attribute("amount", amount))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        LOCK_REPLY_ID => reply_lock(deps, env),
        id => Err(ContractError::UnknownReplyId(id)),
    }
}

/// Credits the pending lock with what the pull actually delivered.
fn reply_lock(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let pending = PENDING_LOCK.load(deps.storage)?;
    PENDING_LOCK.remove(deps.storage);

    let config = CONFIG.load(deps.storage)?;
    let token = lockable_token(deps.as_ref(), &config, &pending.owner)?;
    let balance_after = query_custody(deps.as_ref(), &env, &token)?;
    let delivered = balance_after.checked_sub(pending.balance_before)?;

    credit_lock(deps, &env, &config, token, &pending.owner, delivered)
}

/// Token the owner may lock into right now.
fn lockable_token(deps: Deps, config: &Config, owner: &Addr) -> Result<Addr, ContractError> {
    let state = STATE.load(deps.storage)?;
    if !state.phase.lockup_window() {
        return Err(ContractError::LockupWindowClosed {});
    }

    let token = config.token.clone().ok_or(ContractError::TokenNotSet {})?;
    if let Some(locker_id) = OWNER_LOCKERS.may_load(deps.storage, owner)? {
        if !LOCKERS.load(deps.storage, locker_id)?.is_locked() {
            return Err(ContractError::LockerCancelled {});
        }
    }

    Ok(token)
}

fn query_custody(deps: Deps, env: &Env, token: &Addr) -> StdResult<Uint128> {
    let res: BalanceResponse = deps.querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Balance {
            address: env.contract.address.to_string(),
        },
    )?;
    Ok(res.balance)
}

/// Records `delivered` against the owner's locker, creating it on first lock.
fn credit_lock(
    deps: DepsMut,
    env: &Env,
    config: &Config,
    token: Addr,
    owner: &Addr,
    delivered: Uint128,
) -> Result<Response, ContractError> {
    if delivered.is_zero() {
        return Err(ContractError::ZeroAmount {});
    }

    let mut state = STATE.load(deps.storage)?;
    let locker = match OWNER_LOCKERS.may_load(deps.storage, owner)? {
        Some(locker_id) => {
            let mut locker = LOCKERS.load(deps.storage, locker_id)?;
            locker.amount = locker.amount.checked_add(delivered)?;
            locker
        }
        None => {
            let minimum = config.min_lock_amount()?;
            if delivered < minimum {
                return Err(ContractError::BelowMinimumLock { minimum });
            }

            let locker_id = state.total_lockers;
            state.total_lockers += 1;
            OWNER_LOCKERS.save(deps.storage, owner, &locker_id)?;

            Locker {
                locker_id,
                token,
                owner: owner.clone(),
                state: LockerState::Locked,
                amount: delivered,
                tokens_claimed: Uint128::zero(),
                locked_at: env.block.time.seconds(),
            }
        }
    };

    LOCKERS.save(deps.storage, locker.locker_id, &locker)?;
    state.total_locked = state.total_locked.checked_add(delivered)?;
    STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "lock")
        .add_attribute("locker_id", locker.locker_id.to_string())
        .add_attribute("owner", owner)
        .add_attribute("amount", delivered)
        .add_attribute("total_amount", locker.amount))
}

pub fn execute_unlock_and_cancel(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let locker_id = OWNER_LOCKERS
        .may_load(deps.storage, &info.sender)?
        .ok_or(ContractError::LockerNotFound {})?;
    let mut locker = LOCKERS.load(deps.storage, locker_id)?;

    if !locker.is_locked() {
        return Err(ContractError::LockerAlreadyCancelled {});
    }

    let refund = locker.remaining();
    locker.state = LockerState::Cancelled;
    locker.tokens_claimed = locker.amount;
    LOCKERS.save(deps.storage, locker_id, &locker)?;

    let mut state = STATE.load(deps.storage)?;
    state.total_locked = state.total_locked.checked_sub(refund)?;
    STATE.save(deps.storage, &state)?;

    let mut msgs = vec![];
    if !refund.is_zero() {
        msgs.push(transfer_msg(&locker.token, &locker.owner, refund)?);
    }

    Ok(Response::new()
        .add_messages(msgs)
        .add_attribute("action", "unlock_and_cancel")
        .add_attribute("locker_id", locker_id.to_string())
        .add_attribute("owner", locker.owner)
        .add_attribute("refund", refund))
}

pub fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let mut state = STATE.load(deps.storage)?;
    let started_at = state
        .phase
        .distribution_started_at()
        .ok_or(ContractError::DistributionNotStarted {})?;

    let locker_id = OWNER_LOCKERS
        .may_load(deps.storage, &info.sender)?
        .ok_or(ContractError::NotEligibleToClaim {})?;
    let mut locker = LOCKERS.load(deps.storage, locker_id)?;
    if !locker.is_locked() {
        return Err(ContractError::NotEligibleToClaim {});
    }

    let config = CONFIG.load(deps.storage)?;
    let unlocked = calculate_unlocked_amount(
        &config.vesting,
        locker.amount,
        started_at,
        env.block.time.seconds(),
    );
    let claimable = unlocked.saturating_sub(locker.tokens_claimed);
    if claimable.is_zero() {
        return Err(ContractError::NotEligibleToClaim {});
    }

    locker.tokens_claimed = locker.tokens_claimed.checked_add(claimable)?;
    LOCKERS.save(deps.storage, locker_id, &locker)?;

    state.total_locked = state.total_locked.checked_sub(claimable)?;
    state.total_claimed = state.total_claimed.checked_add(claimable)?;
    STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_message(transfer_msg(&locker.token, &locker.owner, claimable)?)
        .add_attribute("action", "withdraw")
        .add_attribute("locker_id", locker_id.to_string())
        .add_attribute("owner", locker.owner)
        .add_attribute("amount", claimable)
        .add_attribute("tokens_claimed", locker.tokens_claimed))
}

pub fn execute_enable_lockup_window(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    let mut state = STATE.load(deps.storage)?;
    state.phase = state.phase.enable_lockup_window()?;
    STATE.save(deps.storage, &state)?;

    Ok(Response::new().add_attribute("action", "enable_lockup_window"))
}

pub fn execute_disable_lockup_window(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    let mut state = STATE.load(deps.storage)?;
    state.phase = state.phase.disable_lockup_window();
    STATE.save(deps.storage, &state)?;

    Ok(Response::new().add_attribute("action", "disable_lockup_window"))
}

pub fn execute_enable_token_distribution(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    let started_at = env.block.time.seconds();
    let mut state = STATE.load(deps.storage)?;
    state.phase = state.phase.enable_token_distribution(started_at)?;
    STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "enable_token_distribution")
        .add_attribute("started_at", started_at.to_string()))
}

pub fn execute_update_token(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    // Custody would no longer match the recorded lockers
    let state = STATE.load(deps.storage)?;
    if state.total_lockers > 0 {
        return Err(ContractError::TokenAlreadyInUse {});
    }

    config.token = Some(deps.api.addr_validate(&token)?);
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_token")
        .add_attribute("token", token))
}

pub fn execute_update_vesting_schedule(
    deps: DepsMut,
    info: MessageInfo,
    schedule: VestingSchedule,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    let state = STATE.load(deps.storage)?;
    if state.phase.token_distribution_started() {
        return Err(ContractError::DistributionAlreadyActive {});
    }

    validate_schedule(&schedule).map_err(|e| ContractError::InvalidSchedule { reason: e })?;
    config.vesting = schedule;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_vesting_schedule")
        .add_attribute("duration", config.vesting.duration.to_string())
        .add_attribute("release_interval", config.vesting.release_interval.to_string())
        .add_attribute("tge_release_bps", config.vesting.tge_release_bps.to_string()))
}

pub fn execute_update_admin(
    deps: DepsMut,
    info: MessageInfo,
    admin: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    config.admin = deps.api.addr_validate(&admin)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_admin")
        .add_attribute("new_admin", admin))
}

fn transfer_msg(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<WasmMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    })
}

/// Cumulative amount released to this locker as of `now`.
/// Cancelled lockers count as fully settled.
fn unlocked_amount(locker: &Locker, config: &Config, phase: &Phase, now: u64) -> Uint128 {
    match locker.state {
        LockerState::Cancelled => locker.amount,
        LockerState::Locked => match phase.distribution_started_at() {
            Some(started_at) => {
                calculate_unlocked_amount(&config.vesting, locker.amount, started_at, now)
            }
            None => Uint128::zero(),
        },
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Status {} => to_json_binary(&query_status(deps)?),
        QueryMsg::LockerInfo { locker_id } => {
            to_json_binary(&query_locker_info(deps, env, locker_id)?)
        }
        QueryMsg::LockerByOwner { owner } => {
            to_json_binary(&query_locker_by_owner(deps, env, owner)?)
        }
        QueryMsg::Lockers { start_after, limit } => {
            to_json_binary(&query_lockers(deps, env, start_after, limit)?)
        }
        QueryMsg::ClaimableAmount { owner } => {
            to_json_binary(&query_claimable_amount(deps, env, owner)?)
        }
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        min_lock_amount: config.min_lock_amount()?,
        admin: config.admin,
        token: config.token,
        token_decimals: config.token_decimals,
        vesting: config.vesting,
    })
}

fn query_status(deps: Deps) -> StdResult<StatusResponse> {
    let state = STATE.load(deps.storage)?;
    Ok(StatusResponse {
        lockup_window: state.phase.lockup_window(),
        token_distribution_started: state.phase.token_distribution_started(),
        distribution_started_at: state.phase.distribution_started_at(),
        total_lockers: state.total_lockers,
        total_locked: state.total_locked,
        total_claimed: state.total_claimed,
    })
}

fn to_locker_response(locker: Locker, config: &Config, phase: &Phase, now: u64) -> LockerResponse {
    let unlocked = unlocked_amount(&locker, config, phase, now);
    LockerResponse {
        claimable_amount: unlocked.saturating_sub(locker.tokens_claimed),
        locker_id: locker.locker_id,
        token: locker.token,
        owner: locker.owner,
        state: locker.state,
        amount: locker.amount,
        tokens_claimed: locker.tokens_claimed,
        locked_at: locker.locked_at,
    }
}

fn query_locker_info(deps: Deps, env: Env, locker_id: u64) -> StdResult<LockerResponse> {
    let config = CONFIG.load(deps.storage)?;
    let state = STATE.load(deps.storage)?;
    let locker = LOCKERS.load(deps.storage, locker_id)?;
    Ok(to_locker_response(
        locker,
        &config,
        &state.phase,
        env.block.time.seconds(),
    ))
}

fn query_locker_by_owner(
    deps: Deps,
    env: Env,
    owner: String,
) -> StdResult<Option<LockerResponse>> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    OWNER_LOCKERS
        .may_load(deps.storage, &owner_addr)?
        .map(|locker_id| query_locker_info(deps, env, locker_id))
        .transpose()
}

fn query_lockers(
    deps: Deps,
    env: Env,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<LockersResponse> {
    let config = CONFIG.load(deps.storage)?;
    let state = STATE.load(deps.storage)?;
    let now = env.block.time.seconds();
    let limit = limit.unwrap_or(10).min(30) as usize;
    let start = start_after.map(Bound::exclusive);

    let lockers = LOCKERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (_, locker) = item?;
            Ok(to_locker_response(locker, &config, &state.phase, now))
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(LockersResponse { lockers })
}

fn query_claimable_amount(
    deps: Deps,
    env: Env,
    owner: String,
) -> StdResult<ClaimableAmountResponse> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    let Some(locker_id) = OWNER_LOCKERS.may_load(deps.storage, &owner_addr)? else {
        return Ok(ClaimableAmountResponse {
            unlocked_amount: Uint128::zero(),
            claimable_amount: Uint128::zero(),
        });
    };

    let config = CONFIG.load(deps.storage)?;
    let state = STATE.load(deps.storage)?;
    let locker = LOCKERS.load(deps.storage, locker_id)?;
    let unlocked = unlocked_amount(&locker, &config, &state.phase, env.block.time.seconds());

    Ok(ClaimableAmountResponse {
        unlocked_amount: unlocked,
        claimable_amount: unlocked.saturating_sub(locker.tokens_claimed),
    })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let version = get_contract_version(deps.storage)?;

    if version.contract != CONTRACT_NAME {
        return Err(ContractError::InvalidMigration {});
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", version.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
