//! Error types for the progression core
//!
//! Every operation returns a discriminated result. [`ErrorKind`] groups the
//! variants so the transport layer can pick a status code without matching
//! on each one.

use serde::Serialize;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed address or input; the request is rejected
    Validation,
    /// The entity does not exist
    NotFound,
    /// The request conflicts with current state (already claimed, sold out, ...)
    Conflict,
    /// Not enough coins
    InsufficientResource,
    /// Persistence or collaborator failure
    Storage,
}

impl ErrorKind {
    /// HTTP status code used by the API layer
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InsufficientResource => 402,
            ErrorKind::Storage => 500,
        }
    }
}

/// Errors shared by all non-claim operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Collectable not found: {0}")]
    CollectableNotFound(i64),

    #[error("Collectable {0} is not active")]
    CollectableInactive(i64),

    #[error("Collectable {0} already claimed")]
    CollectableAlreadyClaimed(i64),

    #[error("Not eligible for collectable {0}")]
    CollectableNotEligible(i64),

    #[error("Voting locked until {unlocks_at}")]
    VotingLocked { unlocks_at: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Activity lookup failed: {0}")]
    Lookup(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAddress(_) | Error::InvalidInput(_) => ErrorKind::Validation,
            Error::UserNotFound(_) | Error::CollectableNotFound(_) => ErrorKind::NotFound,
            Error::CollectableInactive(_)
            | Error::CollectableAlreadyClaimed(_)
            | Error::CollectableNotEligible(_)
            | Error::VotingLocked { .. } => ErrorKind::Conflict,
            Error::Storage(_) | Error::Lookup(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidAddress(_) => "invalid_address",
            Error::InvalidInput(_) => "invalid_input",
            Error::UserNotFound(_) => "user_not_found",
            Error::CollectableNotFound(_) => "collectable_not_found",
            Error::CollectableInactive(_) => "collectable_inactive",
            Error::CollectableAlreadyClaimed(_) => "already_claimed",
            Error::CollectableNotEligible(_) => "not_eligible",
            Error::VotingLocked { .. } => "voting_locked",
            Error::Storage(_) => "storage",
            Error::Lookup(_) => "lookup_failed",
        }
    }
}

/// Outcome of a rejected reward claim
///
/// The first six variants are the claim-specific outcomes; anything else
/// (bad address, unknown user, storage) arrives through [`ClaimError::Core`].
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("Reward not found: {0}")]
    RewardNotFound(i64),

    #[error("Reward {0} is not active")]
    RewardInactive(i64),

    #[error("Reward {0} is sold out")]
    RewardExhausted(i64),

    #[error("Insufficient coins: price {price}, balance {balance}")]
    InsufficientCoins { price: u64, balance: u64 },

    #[error("Reward {0} already claimed")]
    AlreadyClaimed(i64),

    #[error("Not eligible for reward {0}")]
    NotEligible(i64),

    #[error(transparent)]
    Core(#[from] Error),
}

impl ClaimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimError::RewardNotFound(_) => ErrorKind::NotFound,
            ClaimError::RewardInactive(_)
            | ClaimError::RewardExhausted(_)
            | ClaimError::AlreadyClaimed(_)
            | ClaimError::NotEligible(_) => ErrorKind::Conflict,
            ClaimError::InsufficientCoins { .. } => ErrorKind::InsufficientResource,
            ClaimError::Core(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClaimError::RewardNotFound(_) => "reward_not_found",
            ClaimError::RewardInactive(_) => "reward_inactive",
            ClaimError::RewardExhausted(_) => "reward_exhausted",
            ClaimError::InsufficientCoins { .. } => "insufficient_coins",
            ClaimError::AlreadyClaimed(_) => "already_claimed",
            ClaimError::NotEligible(_) => "not_eligible",
            ClaimError::Core(e) => e.code(),
        }
    }
}

impl From<rusqlite::Error> for ClaimError {
    fn from(e: rusqlite::Error) -> Self {
        ClaimError::Core(Error::Storage(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
