//! XP and coin grants, profiles and the leaderboard

use rusqlite::{Connection, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::levels::{LevelUp, Progress, level_for_xp};
use crate::clock::Clock;
use crate::domain::{User, normalize_address};
use crate::error::{Error, Result};
use crate::store::Db;
use crate::store::users::{ensure_user, find_by_address};

/// Largest balance SQLite can hold in an INTEGER column
const MAX_BALANCE: u64 = i64::MAX as u64;

/// Community actions that earn XP and coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardReason {
    ForumPost,
    ForumReply,
    Vote,
}

impl AwardReason {
    pub fn xp(&self) -> u64 {
        match self {
            AwardReason::ForumPost => 5,
            AwardReason::ForumReply => 2,
            AwardReason::Vote => 10,
        }
    }

    /// Coins granted alongside the XP
    pub fn coins(&self) -> u64 {
        self.xp()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AwardReason::ForumPost => "forum_post",
            AwardReason::ForumReply => "forum_reply",
            AwardReason::Vote => "vote",
        }
    }
}

/// A user with their leveling summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub address: String,
    pub username: Option<String>,
    pub xp: u64,
    pub level: u64,
}

/// Writes XP/coin grants and reads rankings
pub struct Progression<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
}

impl<'a> Progression<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Grant XP and coins, creating the user if needed
    ///
    /// `level` is rewritten in the same statement as `xp`, so the column never
    /// disagrees with the curve.
    pub fn award(&self, address: &str, xp: u64, coins: u64) -> Result<Option<LevelUp>> {
        let address = normalize_address(address)?;
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let user = ensure_user(&tx, &address, self.clock.now_ms())?;
        let level_up = credit(&tx, &user, xp, coins)?;
        tx.commit()?;

        if let Some(up) = &level_up {
            info!(
                "[guildhall:xp] {} reached level {} (was {})",
                address, up.new_level, up.old_level
            );
        }
        Ok(level_up)
    }

    /// Grant the fixed amounts for a community action
    pub fn award_for(&self, address: &str, reason: AwardReason) -> Result<Option<LevelUp>> {
        debug!(
            "[guildhall:xp] {} earned {} xp for {}",
            address,
            reason.xp(),
            reason.as_str()
        );
        self.award(address, reason.xp(), reason.coins())
    }

    pub fn profile(&self, address: &str) -> Result<UserProfile> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        let user = find_by_address(&conn, &address)?.ok_or(Error::UserNotFound(address))?;
        Ok(UserProfile {
            progress: Progress::new(user.xp),
            user,
        })
    }

    /// Top users by lifetime XP
    pub fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT address, username, xp, level FROM users ORDER BY xp DESC, address ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, u64>(2)?,
                    row.get::<_, u64>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, (address, username, xp, level))| LeaderboardEntry {
                rank: i as u32 + 1,
                address,
                username,
                xp,
                level,
            })
            .collect())
    }
}

/// Add xp and coins to a loaded user row inside the caller's transaction
pub(crate) fn credit(conn: &Connection, user: &User, xp: u64, coins: u64) -> rusqlite::Result<Option<LevelUp>> {
    let new_xp = user.xp.saturating_add(xp).min(MAX_BALANCE);
    let new_coins = user.coins.saturating_add(coins).min(MAX_BALANCE);
    conn.execute(
        "UPDATE users SET xp = ?1, coins = ?2, level = ?3 WHERE id = ?4",
        params![new_xp, new_coins, level_for_xp(new_xp), user.id],
    )?;
    Ok(LevelUp::between(user.xp, new_xp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tempfile::tempdir;

    fn addr(n: u8) -> String {
        format!("0x{:040x}", n)
    }

    #[test]
    fn test_award_levels_up_and_credits_coins() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(0);
        let progression = Progression::new(&db, &clock);

        assert_eq!(progression.award(&addr(1), 10, 10).unwrap(), None);
        let up = progression.award(&addr(1), 1, 0).unwrap().unwrap();
        assert_eq!((up.old_level, up.new_level), (1, 2));

        let profile = progression.profile(&addr(1)).unwrap();
        assert_eq!(profile.user.xp, 11);
        assert_eq!(profile.user.coins, 10);
        assert_eq!(profile.user.level, 2);
        assert_eq!(profile.progress.xp_for_next_level, 30);
    }

    #[test]
    fn test_award_for_reason() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(0);
        let progression = Progression::new(&db, &clock);

        progression.award_for(&addr(1), AwardReason::ForumPost).unwrap();
        progression.award_for(&addr(1), AwardReason::ForumReply).unwrap();
        let profile = progression.profile(&addr(1)).unwrap();
        assert_eq!(profile.user.xp, 7);
        assert_eq!(profile.user.coins, 7);
    }

    #[test]
    fn test_profile_unknown_user() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(0);
        let err = Progression::new(&db, &clock).profile(&addr(9)).unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[test]
    fn test_leaderboard_order() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(0);
        let progression = Progression::new(&db, &clock);

        progression.award(&addr(1), 50, 0).unwrap();
        progression.award(&addr(2), 120, 0).unwrap();
        progression.award(&addr(3), 50, 0).unwrap();

        let board = progression.leaderboard(2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].address, addr(2));
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].address, addr(1)); // tie broken by address
        assert_eq!(board[1].level, 3);
    }
}
