//! Guildhall - community progression core
//!
//! Guildhall keeps the stateful part of a community site: lifetime XP and the
//! level curve, a coin-funded rewards shop with at-most-once claims and
//! bounded supply, free collectables gated by wallet history, online presence
//! and the daily voting cooldown. State lives in one SQLite file that several
//! server processes may share.
//!
//! ## Entry points
//!
//! 1. **Library**: [`Guildhall`] bundles the database, clock, config and
//!    eligibility resolver and exposes every operation.
//!
//! 2. **HTTP**: `guildhall serve` runs a small JSON API over the same
//!    operations (see [`server`]).

pub mod activity;
pub mod clock;
pub mod collectables;
pub mod config;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod progression;
pub mod rewards;
pub mod server;
pub mod store;
pub mod voting;

pub use domain::*;
pub use error::{ClaimError, Error, ErrorKind, Result};

use std::sync::Arc;
use std::time::Duration;

use activity::ActivityTracker;
use clock::Clock;
use collectables::Collectables;
use config::Config;
use eligibility::{ActivityOracle, EligibilityResolver};
use progression::{AwardReason, LeaderboardEntry, LevelUp, Progress, Progression, UserProfile, XpProgress};
use rewards::{ClaimLedger, RewardCatalog, SeedFile, SeedReport};
use store::{Db, UserRepository};
use voting::VotingLock;

/// Application handle shared by the CLI and the HTTP server
///
/// Cheap to clone; clones share the database connection.
#[derive(Clone)]
pub struct Guildhall {
    db: Db,
    clock: Arc<dyn Clock>,
    eligibility: EligibilityResolver,
    config: Arc<Config>,
}

impl Guildhall {
    /// Open the configured database
    pub fn open(config: Config, oracle: Arc<dyn ActivityOracle>, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let db = Db::open_with_timeout(
            &config.database_path(),
            Duration::from_millis(config.database.busy_timeout_ms),
        )?;
        Ok(Self::with_db(db, config, oracle, clock))
    }

    pub fn with_db(db: Db, config: Config, oracle: Arc<dyn ActivityOracle>, clock: Arc<dyn Clock>) -> Self {
        let eligibility = EligibilityResolver::new(db.clone(), oracle);
        Self {
            db,
            clock,
            eligibility,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // Leveling

    pub fn level(&self, xp: u64) -> Progress {
        Progress::new(xp)
    }

    pub fn xp_for_next_level(&self, xp: u64) -> u64 {
        progression::xp_for_next_level(xp)
    }

    pub fn xp_progress(&self, xp: u64) -> XpProgress {
        progression::xp_progress(xp)
    }

    // Shop

    pub fn list_rewards(&self, address: Option<&str>) -> Result<Vec<RewardView>> {
        RewardCatalog::new(&self.db, self.clock()).list_active(address)
    }

    pub fn claim_reward(&self, address: &str, reward_id: i64) -> Result<Claim, ClaimError> {
        ClaimLedger::new(&self.db, self.clock(), &self.eligibility).claim(address, reward_id)
    }

    pub fn claims(&self, address: &str) -> Result<Vec<Claim>> {
        ClaimLedger::new(&self.db, self.clock(), &self.eligibility).claims_for(address)
    }

    pub fn seed(&self, seed: &SeedFile) -> Result<SeedReport> {
        rewards::apply_seed(&self.db, self.clock(), seed)
    }

    pub fn backfill_coins_spent(&self) -> Result<usize> {
        rewards::backfill_coins_spent(&self.db)
    }

    // Presence

    fn activity(&self) -> ActivityTracker<'_> {
        ActivityTracker::new(&self.db, self.clock(), &self.config.activity)
    }

    pub fn ping_activity(&self, address: &str) -> Result<()> {
        self.activity().ping(address)
    }

    pub fn clear_activity(&self, address: &str) -> Result<()> {
        self.activity().clear(address)
    }

    pub fn count_active_users(&self, window_secs: u64) -> Result<u64> {
        self.activity().count_active(window_secs)
    }

    // Voting

    fn voting(&self) -> VotingLock<'_> {
        VotingLock::new(&self.db, self.clock(), &self.config.voting)
    }

    pub fn is_voting_locked(&self, address: &str) -> Result<bool> {
        self.voting().is_locked(address)
    }

    pub fn vote_unlocks_at(&self, address: &str) -> Result<Option<i64>> {
        self.voting().unlocks_at(address)
    }

    pub fn record_vote(&self, address: &str) -> Result<Vote> {
        self.voting().record_vote(address)
    }

    // Collectables

    pub fn list_collectables(&self, address: Option<&str>) -> Result<Vec<CollectableView>> {
        Collectables::new(&self.db, self.clock(), &self.eligibility).list(address)
    }

    pub fn claim_collectable(&self, address: &str, collectable_id: i64) -> Result<CollectableClaim> {
        Collectables::new(&self.db, self.clock(), &self.eligibility).claim(address, collectable_id)
    }

    // Users

    pub fn award(&self, address: &str, xp: u64, coins: u64) -> Result<Option<LevelUp>> {
        Progression::new(&self.db, self.clock()).award(address, xp, coins)
    }

    pub fn award_for(&self, address: &str, reason: AwardReason) -> Result<Option<LevelUp>> {
        Progression::new(&self.db, self.clock()).award_for(address, reason)
    }

    pub fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        Progression::new(&self.db, self.clock()).leaderboard(limit)
    }

    pub fn profile(&self, address: &str) -> Result<UserProfile> {
        Progression::new(&self.db, self.clock()).profile(address)
    }

    pub fn set_username(&self, address: &str, username: &str) -> Result<User> {
        UserRepository::new(&self.db, self.clock()).set_username(address, username)
    }

    pub fn link_discord(&self, address: &str, discord_id: &str) -> Result<User> {
        UserRepository::new(&self.db, self.clock()).link_discord(address, discord_id)
    }
}
