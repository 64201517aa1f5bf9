use serde::{Deserialize, Serialize};

/// A community member, keyed by wallet address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub address: String,
    pub username: Option<String>,
    /// Lifetime-earned XP, never decreases
    pub xp: u64,
    /// Spendable balance
    pub coins: u64,
    /// Derived from `xp`; only ever written together with it
    pub level: u64,
    pub discord_id: Option<String>,
    /// Last activity ping (ms), `None` when not currently online
    pub last_active: Option<i64>,
    /// Cached year of the wallet's first on-chain transaction
    pub first_activity_year: Option<i32>,
    pub created_at: i64,
}

impl User {
    /// Column list matching [`User::from_row`]
    pub(crate) const COLUMNS: &'static str = "id, address, username, xp, coins, level, discord_id, \
         last_active, first_activity_year, created_at";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            address: row.get(1)?,
            username: row.get(2)?,
            xp: row.get(3)?,
            coins: row.get(4)?,
            level: row.get(5)?,
            discord_id: row.get(6)?,
            last_active: row.get(7)?,
            first_activity_year: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}
