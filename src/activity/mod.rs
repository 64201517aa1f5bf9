//! Presence tracking: who is online right now
//!
//! Each user row carries a nullable `last_active`. A ping sets it, a wallet
//! disconnect clears it, and stale values are nulled lazily whenever someone
//! pings or the online count is read. No background sweeper.

use rusqlite::{TransactionBehavior, params};
use tracing::debug;

use crate::clock::Clock;
use crate::config::ActivitySettings;
use crate::domain::normalize_address;
use crate::error::Result;
use crate::store::Db;
use crate::store::users::ensure_user;

pub struct ActivityTracker<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
    settings: &'a ActivitySettings,
}

impl<'a> ActivityTracker<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock, settings: &'a ActivitySettings) -> Self {
        Self { db, clock, settings }
    }

    /// Mark the user active now, creating the row on first contact
    ///
    /// `last_active` never moves backwards, even if an older ping lands after a
    /// newer one.
    pub fn ping(&self, address: &str) -> Result<()> {
        let address = normalize_address(address)?;
        let now = self.clock.now_ms();
        let cutoff = now - secs_to_ms(self.settings.ping_expiry_secs);

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, &address, now)?;
        tx.execute(
            "UPDATE users SET last_active = MAX(COALESCE(last_active, 0), ?1) WHERE address = ?2",
            params![now, address],
        )?;
        let expired = tx.execute(
            "UPDATE users SET last_active = NULL WHERE last_active IS NOT NULL AND last_active < ?1",
            params![cutoff],
        )?;
        tx.commit()?;

        if expired > 0 {
            debug!("[guildhall:activity] expired {} stale entries", expired);
        }
        Ok(())
    }

    /// Users seen within the last `window_secs`
    ///
    /// Entries outside the window are nulled in the same transaction, so the
    /// count and the stored state agree.
    pub fn count_active(&self, window_secs: u64) -> Result<u64> {
        let cutoff = self.clock.now_ms() - secs_to_ms(window_secs);

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE users SET last_active = NULL WHERE last_active IS NOT NULL AND last_active < ?1",
            params![cutoff],
        )?;
        let count: u64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE last_active IS NOT NULL",
            [],
            |r| r.get(0),
        )?;
        tx.commit()?;
        Ok(count)
    }

    /// Online count over the configured window
    pub fn count_online(&self) -> Result<u64> {
        self.count_active(self.settings.online_window_secs)
    }

    /// Forget the user's presence. Unknown addresses are ignored.
    pub fn clear(&self, address: &str) -> Result<()> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        conn.execute(
            "UPDATE users SET last_active = NULL WHERE address = ?1",
            params![address],
        )?;
        Ok(())
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}
