//! Core domain types for Guildhall

mod address;
mod claim;
mod collectable;
mod reward;
mod user;

pub use address::normalize_address;
pub use claim::{Claim, Vote};
pub use collectable::{Collectable, CollectableClaim, CollectableView, NewCollectable};
pub use reward::{NewReward, Reward, RewardView};
pub use user::User;
