//! Catalog seeding from a TOML file
//!
//! ```toml
//! [[rewards]]
//! name = "Hoodie"
//! xpRequired = 500
//! totalAvailable = 25
//!
//! [[collectables]]
//! name = "Genesis badge"
//! requiredYear = 2017
//! ```
//!
//! Entries are matched by name; ones already present are skipped, so the same
//! file can be applied repeatedly. A run is a single write transaction, so
//! instances seeding the same file at once still create each entry once.

use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Deserialize;
use tracing::{debug, info};

use super::catalog::insert_reward;
use crate::clock::Clock;
use crate::collectables::insert_collectable;
use crate::domain::{NewCollectable, NewReward};
use crate::error::Result;
use crate::store::Db;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub rewards: Vec<NewReward>,
    #[serde(default)]
    pub collectables: Vec<NewCollectable>,
}

impl SeedFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))
    }
}

/// What a seed run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub rewards_created: usize,
    pub rewards_skipped: usize,
    pub collectables_created: usize,
    pub collectables_skipped: usize,
}

pub fn apply_seed(db: &Db, clock: &dyn Clock, seed: &SeedFile) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let now_ms = clock.now_ms();

    let mut conn = db.conn();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    for reward in &seed.rewards {
        if name_exists(&tx, "rewards", &reward.name)? {
            debug!("[guildhall:seed] reward '{}' exists, skipping", reward.name);
            report.rewards_skipped += 1;
            continue;
        }
        insert_reward(&tx, reward, now_ms)?;
        report.rewards_created += 1;
    }

    for collectable in &seed.collectables {
        if name_exists(&tx, "collectables", &collectable.name)? {
            debug!("[guildhall:seed] collectable '{}' exists, skipping", collectable.name);
            report.collectables_skipped += 1;
            continue;
        }
        insert_collectable(&tx, collectable, now_ms)?;
        report.collectables_created += 1;
    }

    tx.commit()?;

    info!(
        "[guildhall:seed] rewards: {} created, {} skipped; collectables: {} created, {} skipped",
        report.rewards_created,
        report.rewards_skipped,
        report.collectables_created,
        report.collectables_skipped
    );
    Ok(report)
}

fn name_exists(conn: &Connection, table: &str, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE name = ?1 LIMIT 1"),
            params![name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
