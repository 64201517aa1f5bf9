//! Request bodies and the transport-neutral response

use serde::Deserialize;

use crate::error::{ClaimError, Error, ErrorKind};
use crate::progression::AwardReason;

/// Status plus JSON body, produced by handlers and written by the server loop
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, code: &str, details: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": code, "details": details.into() }),
        }
    }

    pub fn not_found() -> Self {
        Self::error(404, "not_found", "no such route")
    }

    pub fn unauthorized() -> Self {
        Self::error(401, "unauthorized", "missing or wrong token")
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::error(400, "bad_request", details)
    }

    fn from_kind(kind: ErrorKind, code: &str, details: String) -> Self {
        if kind == ErrorKind::Storage {
            tracing::error!("[guildhall:http] {}: {}", code, details);
        }
        Self::error(kind.status_code(), code, details)
    }
}

impl From<Error> for ApiResponse {
    fn from(err: Error) -> Self {
        Self::from_kind(err.kind(), err.code(), err.to_string())
    }
}

impl From<ClaimError> for ApiResponse {
    fn from(err: ClaimError) -> Self {
        Self::from_kind(err.kind(), err.code(), err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaimRequest {
    pub address: String,
    pub reward_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectableClaimRequest {
    pub address: String,
    pub collectable_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    pub address: String,
    /// Community action with fixed amounts; excludes explicit `xp`/`coins`
    #[serde(default)]
    pub reason: Option<AwardReason>,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub coins: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub discord_id: Option<String>,
}
