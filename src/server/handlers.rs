//! Route handlers
//!
//! Each handler takes the already-read body or query and returns an
//! [`ApiResponse`]; none of them touch the socket.

use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{
    AddressRequest, ApiResponse, AwardRequest, CollectableClaimRequest, ProfileUpdateRequest,
    RewardClaimRequest,
};
use crate::Guildhall;

const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;
const MAX_LEADERBOARD_LIMIT: u32 = 500;

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body).map_err(|e| ApiResponse::bad_request(format!("invalid JSON body: {e}")))
}

/// Value of `key` in a raw query string
pub(crate) fn query_param<'q>(query: &'q str, key: &str) -> Option<&'q str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

fn serialized<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| json!({ "error": "serialize" }))
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, ApiResponse> {
    raw.parse()
        .map_err(|_| ApiResponse::bad_request(format!("{name} must be a non-negative integer")))
}

pub(crate) fn handle_ping() -> ApiResponse {
    ApiResponse::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) fn handle_level(app: &Guildhall, query: &str) -> ApiResponse {
    let Some(raw) = query_param(query, "xp") else {
        return ApiResponse::bad_request("missing xp");
    };
    match parse_number::<u64>(raw, "xp") {
        Ok(xp) => {
            let progress = app.level(xp);
            let band = app.xp_progress(xp);
            ApiResponse::ok(json!({
                "xp": xp,
                "level": progress.level,
                "xpForNextLevel": progress.xp_for_next_level,
                "progress": { "current": band.current, "total": band.total },
            }))
        }
        Err(resp) => resp,
    }
}

pub(crate) fn handle_rewards_list(app: &Guildhall, query: &str) -> ApiResponse {
    match app.list_rewards(query_param(query, "address")) {
        Ok(rewards) => ApiResponse::ok(json!({ "rewards": serialized(&rewards) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_reward_claim(app: &Guildhall, body: &str) -> ApiResponse {
    let req: RewardClaimRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match app.claim_reward(&req.address, req.reward_id) {
        Ok(claim) => ApiResponse::ok(json!({ "claim": serialized(&claim) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_collectables_list(app: &Guildhall, query: &str) -> ApiResponse {
    match app.list_collectables(query_param(query, "address")) {
        Ok(items) => ApiResponse::ok(json!({ "collectables": serialized(&items) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_collectable_claim(app: &Guildhall, body: &str) -> ApiResponse {
    let req: CollectableClaimRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match app.claim_collectable(&req.address, req.collectable_id) {
        Ok(claim) => ApiResponse::ok(json!({ "claim": serialized(&claim) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_activity_ping(app: &Guildhall, body: &str) -> ApiResponse {
    let req: AddressRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match app.ping_activity(&req.address) {
        Ok(()) => ApiResponse::ok(json!({ "status": "ok" })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_activity_clear(app: &Guildhall, body: &str) -> ApiResponse {
    let req: AddressRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match app.clear_activity(&req.address) {
        Ok(()) => ApiResponse::ok(json!({ "status": "ok" })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_activity_count(app: &Guildhall, query: &str) -> ApiResponse {
    let window = match query_param(query, "window") {
        Some(raw) => match parse_number::<u64>(raw, "window") {
            Ok(w) => w,
            Err(resp) => return resp,
        },
        None => app.config().activity.online_window_secs,
    };
    match app.count_active_users(window) {
        Ok(count) => ApiResponse::ok(json!({ "count": count, "windowSecs": window })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_vote_lock(app: &Guildhall, query: &str) -> ApiResponse {
    let Some(address) = query_param(query, "address") else {
        return ApiResponse::bad_request("missing address");
    };
    match app.vote_unlocks_at(address) {
        Ok(unlocks_at) => ApiResponse::ok(json!({
            "locked": unlocks_at.is_some(),
            "unlocksAt": unlocks_at,
        })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_user_profile(app: &Guildhall, path: &str) -> ApiResponse {
    let address = path.trim_start_matches("/api/users/");
    match app.profile(address) {
        Ok(profile) => ApiResponse::ok(json!({ "user": serialized(&profile) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_leaderboard(app: &Guildhall, query: &str) -> ApiResponse {
    let limit = match query_param(query, "limit") {
        Some(raw) => match parse_number::<u32>(raw, "limit") {
            Ok(l) => l.clamp(1, MAX_LEADERBOARD_LIMIT),
            Err(resp) => return resp,
        },
        None => DEFAULT_LEADERBOARD_LIMIT,
    };
    match app.leaderboard(limit) {
        Ok(entries) => ApiResponse::ok(json!({ "leaderboard": serialized(&entries) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_award(app: &Guildhall, body: &str) -> ApiResponse {
    let req: AwardRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let result = match req.reason {
        Some(_) if req.xp > 0 || req.coins > 0 => {
            return ApiResponse::bad_request("give either reason or xp/coins, not both");
        }
        Some(reason) => app.award_for(&req.address, reason),
        None => app.award(&req.address, req.xp, req.coins),
    };
    match result {
        Ok(level_up) => ApiResponse::ok(json!({ "levelUp": serialized(&level_up) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_vote(app: &Guildhall, body: &str) -> ApiResponse {
    let req: AddressRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match app.record_vote(&req.address) {
        Ok(vote) => ApiResponse::ok(json!({ "vote": serialized(&vote) })),
        Err(e) => e.into(),
    }
}

pub(crate) fn handle_profile_update(app: &Guildhall, body: &str) -> ApiResponse {
    let req: ProfileUpdateRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    if let Some(username) = &req.username {
        if let Err(e) = app.set_username(&req.address, username) {
            return e.into();
        }
    }
    if let Some(discord_id) = &req.discord_id {
        if let Err(e) = app.link_discord(&req.address, discord_id) {
            return e.into();
        }
    }
    match app.profile(&req.address) {
        Ok(profile) => ApiResponse::ok(json!({ "user": serialized(&profile) })),
        Err(e) => e.into(),
    }
}
