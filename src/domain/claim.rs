use serde::{Deserialize, Serialize};

/// Permanent record of a reward redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    /// Reward price at claim time. `None` only on legacy rows that predate the
    /// column and have not been backfilled yet.
    pub coins_spent: Option<u64>,
    pub claimed_at: i64,
}

impl Claim {
    pub(crate) const COLUMNS: &'static str = "id, user_id, reward_id, coins_spent, claimed_at";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            reward_id: row.get(2)?,
            coins_spent: row.get(3)?,
            claimed_at: row.get(4)?,
        })
    }
}

/// A recorded vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub user_id: i64,
    pub voted_date: i64,
}
