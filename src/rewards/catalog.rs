//! Reward catalog: read model over the shop

use rusqlite::{Connection, OptionalExtension, params};

use crate::clock::Clock;
use crate::domain::{NewReward, Reward, RewardView, normalize_address};
use crate::error::{Error, Result};
use crate::store::Db;
use crate::store::users::find_by_address;

pub(crate) fn find_reward(conn: &Connection, reward_id: i64) -> rusqlite::Result<Option<Reward>> {
    conn.query_row(
        &format!("SELECT {} FROM rewards WHERE id = ?1", Reward::COLUMNS),
        params![reward_id],
        Reward::from_row,
    )
    .optional()
}

pub(crate) fn insert_reward(conn: &Connection, new: &NewReward, now_ms: i64) -> Result<Reward> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("reward name is empty".to_string()));
    }
    let contract = new
        .contract_address
        .as_deref()
        .map(normalize_address)
        .transpose()?;

    conn.execute(
        r#"INSERT INTO rewards
           (name, description, image_url, xp_required, total_available, claimed, active,
            contract_address, required_year, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9)"#,
        params![
            name,
            new.description,
            new.image_url,
            new.price,
            new.total_available,
            new.active,
            contract,
            new.required_year,
            now_ms,
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_reward(conn, id)?.ok_or_else(|| Error::InvalidInput(format!("reward {id} vanished")))
}

pub struct RewardCatalog<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
}

impl<'a> RewardCatalog<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Active rewards, cheapest first
    ///
    /// With an address, each entry reports whether that user already claimed
    /// it; unknown users simply have claimed nothing.
    pub fn list_active(&self, address: Option<&str>) -> Result<Vec<RewardView>> {
        let address = address.map(normalize_address).transpose()?;
        let conn = self.db.conn();

        let user_id = match &address {
            Some(address) => find_by_address(&conn, address)?.map(|u| u.id),
            None => None,
        };

        let mut stmt = conn.prepare(&format!(
            r#"SELECT {},
                   EXISTS(SELECT 1 FROM claims c WHERE c.reward_id = r.id AND c.user_id = ?1)
               FROM rewards r
               WHERE r.active = 1
               ORDER BY r.xp_required ASC, r.id ASC"#,
            Reward::COLUMNS
        ))?;

        let views = stmt
            .query_map(params![user_id], |row| {
                let reward = Reward::from_row(row)?;
                let has_claimed: bool = row.get(10)?;
                Ok(RewardView {
                    available: reward.available(),
                    has_claimed,
                    reward,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(views)
    }

    pub fn get(&self, reward_id: i64) -> Result<Option<Reward>> {
        let conn = self.db.conn();
        Ok(find_reward(&conn, reward_id)?)
    }

    /// Add a reward definition
    pub fn create(&self, new: &NewReward) -> Result<Reward> {
        let conn = self.db.conn();
        insert_reward(&conn, new, self.clock.now_ms())
    }

    /// Toggle whether a reward is offered in the shop
    pub fn set_active(&self, reward_id: i64, active: bool) -> Result<bool> {
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE rewards SET active = ?1 WHERE id = ?2",
            params![active, reward_id],
        )?;
        Ok(changed > 0)
    }
}
