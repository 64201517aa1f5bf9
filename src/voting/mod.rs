//! Vote cooldown

use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::clock::Clock;
use crate::config::VotingSettings;
use crate::domain::{Vote, normalize_address};
use crate::error::{Error, Result};
use crate::progression::{AwardReason, credit};
use crate::store::Db;
use crate::store::users::ensure_user;

pub struct VotingLock<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
    settings: &'a VotingSettings,
}

impl<'a> VotingLock<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock, settings: &'a VotingSettings) -> Self {
        Self { db, clock, settings }
    }

    fn lock_ms(&self) -> i64 {
        i64::from(self.settings.lock_hours) * 3_600_000
    }

    /// Whether the user voted within the cooldown. Unknown users are unlocked.
    pub fn is_locked(&self, address: &str) -> Result<bool> {
        Ok(self.unlocks_at(address)?.is_some())
    }

    /// When the current lock ends, `None` if not locked
    pub fn unlocks_at(&self, address: &str) -> Result<Option<i64>> {
        let Some(last) = self.last_vote(address)? else {
            return Ok(None);
        };
        let unlocks_at = last.voted_date.saturating_add(self.lock_ms());
        Ok((unlocks_at > self.clock.now_ms()).then_some(unlocks_at))
    }

    /// Most recent vote of the user
    pub fn last_vote(&self, address: &str) -> Result<Option<Vote>> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        Ok(conn
            .query_row(
                r#"SELECT v.id, v.user_id, v.voted_date FROM votes v
                   JOIN users u ON u.id = v.user_id
                   WHERE u.address = ?1
                   ORDER BY v.voted_date DESC, v.id DESC LIMIT 1"#,
                params![address],
                |row| {
                    Ok(Vote {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        voted_date: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    /// Record a vote and grant its XP and coins
    ///
    /// Lock check, insert and award share one write transaction, so two
    /// concurrent votes cannot both pass the check.
    pub fn record_vote(&self, address: &str) -> Result<Vote> {
        let address = normalize_address(address)?;
        let now = self.clock.now_ms();
        let reason = AwardReason::Vote;

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let user = ensure_user(&tx, &address, now)?;

        let last: Option<i64> = tx.query_row(
            "SELECT MAX(voted_date) FROM votes WHERE user_id = ?1",
            params![user.id],
            |r| r.get(0),
        )?;
        if let Some(last) = last {
            let unlocks_at = last.saturating_add(self.lock_ms());
            if unlocks_at > now {
                return Err(Error::VotingLocked { unlocks_at });
            }
        }

        tx.execute(
            "INSERT INTO votes (user_id, voted_date) VALUES (?1, ?2)",
            params![user.id, now],
        )?;
        let vote_id = tx.last_insert_rowid();
        let level_up = credit(&tx, &user, reason.xp(), reason.coins())?;
        tx.commit()?;

        info!("[guildhall:vote] {} voted (+{} xp)", address, reason.xp());
        if let Some(up) = level_up {
            info!("[guildhall:xp] {} reached level {} (was {})", address, up.new_level, up.old_level);
        }

        Ok(Vote {
            id: vote_id,
            user_id: user.id,
            voted_date: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::progression::Progression;
    use chrono::Duration;
    use tempfile::tempdir;

    const ADDR: &str = "0x00000000000000000000000000000000000000aa";
    const NOW: i64 = 1_700_000_000_000;

    fn insert_vote(db: &Db, voted_date: i64) {
        let conn = db.conn();
        ensure_user(&conn, ADDR, 0).unwrap();
        conn.execute(
            "INSERT INTO votes (user_id, voted_date) SELECT id, ?1 FROM users WHERE address = ?2",
            params![voted_date, ADDR],
        )
        .unwrap();
    }

    #[test]
    fn test_lock_boundaries() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(NOW);
        let settings = VotingSettings::default();
        let lock = VotingLock::new(&db, &clock, &settings);

        assert!(!lock.is_locked(ADDR).unwrap());

        insert_vote(&db, NOW - Duration::hours(25).num_milliseconds());
        assert!(!lock.is_locked(ADDR).unwrap());

        insert_vote(&db, NOW - Duration::hours(23).num_milliseconds());
        assert!(lock.is_locked(ADDR).unwrap());
        assert_eq!(
            lock.unlocks_at(ADDR).unwrap(),
            Some(NOW + Duration::hours(1).num_milliseconds())
        );
    }

    #[test]
    fn test_record_vote_refuses_while_locked() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(NOW);
        let settings = VotingSettings::default();
        let lock = VotingLock::new(&db, &clock, &settings);

        let vote = lock.record_vote(ADDR).unwrap();
        assert_eq!(vote.voted_date, NOW);

        clock.advance(Duration::hours(2));
        let err = lock.record_vote(ADDR).unwrap_err();
        assert!(matches!(err, Error::VotingLocked { unlocks_at } if unlocks_at == NOW + 86_400_000));

        clock.advance(Duration::hours(22));
        lock.record_vote(ADDR).unwrap();

        let profile = Progression::new(&db, &clock).profile(ADDR).unwrap();
        assert_eq!(profile.user.xp, 2 * AwardReason::Vote.xp());
        assert_eq!(profile.user.coins, 2 * AwardReason::Vote.coins());
    }
}
