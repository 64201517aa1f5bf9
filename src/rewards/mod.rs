//! Rewards shop: catalog, claiming, seeding and repairs

mod catalog;
mod ledger;
mod repair;
mod seed;

pub use catalog::RewardCatalog;
pub use ledger::ClaimLedger;
pub use repair::backfill_coins_spent;
pub use seed::{SeedFile, SeedReport, apply_seed};
