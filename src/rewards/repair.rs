//! One-off data repairs

use tracing::info;

use crate::error::Result;
use crate::store::Db;

/// Fill `claims.coins_spent` on rows written before the column existed
///
/// Uses the reward's current price, which is the best record left for those
/// claims. Returns the number of rows updated; running it again returns 0.
pub fn backfill_coins_spent(db: &Db) -> Result<usize> {
    let conn = db.conn();
    let updated = conn.execute(
        r#"UPDATE claims
           SET coins_spent = (SELECT r.xp_required FROM rewards r WHERE r.id = claims.reward_id)
           WHERE coins_spent IS NULL
             AND EXISTS (SELECT 1 FROM rewards r WHERE r.id = claims.reward_id)"#,
        [],
    )?;

    if updated > 0 {
        info!("[guildhall:repair] backfilled coins_spent on {} claims", updated);
    } else {
        info!("[guildhall:repair] no claims missing coins_spent");
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::tempdir;

    #[test]
    fn test_backfill_is_idempotent() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        {
            let conn = db.conn();
            conn.execute(
                "INSERT INTO users (id, address, created_at) VALUES (1, '0xa', 0), (2, '0xb', 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO rewards (id, name, xp_required, total_available, claimed, created_at)
                 VALUES (1, 'Hoodie', 250, 10, 2, 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO claims (user_id, reward_id, coins_spent, claimed_at) VALUES (1, 1, NULL, 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO claims (user_id, reward_id, coins_spent, claimed_at) VALUES (2, 1, ?1, 0)",
                params![200],
            )
            .unwrap();
        }

        assert_eq!(backfill_coins_spent(&db).unwrap(), 1);
        assert_eq!(backfill_coins_spent(&db).unwrap(), 0);

        let conn = db.conn();
        let spent: Vec<u64> = conn
            .prepare("SELECT coins_spent FROM claims ORDER BY user_id")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        // Rows that already had a value are left alone
        assert_eq!(spent, vec![250, 200]);
    }
}
