//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use guildhall::Guildhall;
use guildhall::clock::ManualClock;
use guildhall::config::Config;
use guildhall::domain::NewReward;
use guildhall::eligibility::StaticOracle;
use guildhall::rewards::SeedFile;
use guildhall::store::Db;

pub const START_MS: i64 = 1_700_000_000_000;

/// A throwaway database file plus a shared manual clock
pub struct TestEnv {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub clock: ManualClock,
    pub oracle: StaticOracle,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_oracle(StaticOracle::new())
    }

    pub fn with_oracle(oracle: StaticOracle) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("guildhall.db");
        Self {
            dir,
            db_path,
            clock: ManualClock::at_millis(START_MS),
            oracle,
        }
    }

    /// A fresh handle with its own connection, like a separate server process
    pub fn instance(&self) -> Guildhall {
        let db = Db::open(&self.db_path).expect("Failed to open test db");
        Guildhall::with_db(
            db,
            Config::default(),
            Arc::new(self.oracle.clone()),
            Arc::new(self.clock.clone()),
        )
    }
}

pub fn addr(n: u32) -> String {
    format!("0x{:040x}", n)
}

pub fn new_reward(name: &str, price: u64, total: u64) -> NewReward {
    NewReward {
        name: name.to_string(),
        description: String::new(),
        image_url: None,
        price,
        total_available: total,
        active: true,
        contract_address: None,
        required_year: None,
    }
}

/// Seed one active reward and return its id
pub fn seed_reward(app: &Guildhall, reward: NewReward) -> i64 {
    let name = reward.name.clone();
    app.seed(&SeedFile {
        rewards: vec![reward],
        collectables: Vec::new(),
    })
    .expect("Failed to seed reward");
    app.list_rewards(None)
        .expect("Failed to list rewards")
        .into_iter()
        .find(|v| v.reward.name == name)
        .map(|v| v.reward.id)
        .expect("seeded reward not listed")
}
