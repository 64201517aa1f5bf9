//! Free cosmetic collectables gated by wallet history
//!
//! Unlike rewards there is no price and no supply; the only rules are
//! once per user and the eligibility gate.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::clock::Clock;
use crate::domain::{Collectable, CollectableClaim, CollectableView, NewCollectable, normalize_address};
use crate::eligibility::EligibilityResolver;
use crate::error::{Error, Result};
use crate::store::users::find_by_address;
use crate::store::{Db, is_constraint_violation};

pub(crate) fn insert_collectable(conn: &Connection, new: &NewCollectable, now_ms: i64) -> Result<Collectable> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("collectable name is empty".to_string()));
    }
    let contract = new
        .contract_address
        .as_deref()
        .map(normalize_address)
        .transpose()?;

    conn.execute(
        r#"INSERT INTO collectables
           (name, description, image_url, active, contract_address, required_year, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        params![
            name,
            new.description,
            new.image_url,
            new.active,
            contract,
            new.required_year,
            now_ms,
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_collectable(conn, id)?.ok_or(Error::CollectableNotFound(id))
}

fn find_collectable(conn: &Connection, id: i64) -> rusqlite::Result<Option<Collectable>> {
    conn.query_row(
        &format!("SELECT {} FROM collectables WHERE id = ?1", Collectable::COLUMNS),
        params![id],
        Collectable::from_row,
    )
    .optional()
}

pub struct Collectables<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
    eligibility: &'a EligibilityResolver,
}

impl<'a> Collectables<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock, eligibility: &'a EligibilityResolver) -> Self {
        Self {
            db,
            clock,
            eligibility,
        }
    }

    /// Active collectables; with an address, also claim and eligibility state
    pub fn list(&self, address: Option<&str>) -> Result<Vec<CollectableView>> {
        let address = address.map(normalize_address).transpose()?;

        let rows = {
            let conn = self.db.conn();
            let user_id = match &address {
                Some(address) => find_by_address(&conn, address)?.map(|u| u.id),
                None => None,
            };
            let mut stmt = conn.prepare(&format!(
                r#"SELECT {},
                       EXISTS(SELECT 1 FROM collectable_claims cc
                              WHERE cc.collectable_id = c.id AND cc.user_id = ?1)
                   FROM collectables c
                   WHERE c.active = 1
                   ORDER BY c.id ASC"#,
                Collectable::COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![user_id], |row| {
                    Ok((Collectable::from_row(row)?, row.get::<_, bool>(7)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        // Eligibility lookups may go to the network; the connection is released by now
        let mut views = Vec::with_capacity(rows.len());
        for (collectable, has_claimed) in rows {
            let eligible = match &address {
                Some(address) => Some(self.eligibility.check(
                    address,
                    collectable.required_year,
                    collectable.contract_address.as_deref(),
                )?),
                None => None,
            };
            views.push(CollectableView {
                collectable,
                has_claimed,
                eligible,
            });
        }
        Ok(views)
    }

    /// Claim a collectable once
    pub fn claim(&self, address: &str, collectable_id: i64) -> Result<CollectableClaim> {
        let address = normalize_address(address)?;

        let snapshot = {
            let conn = self.db.conn();
            find_collectable(&conn, collectable_id)?.ok_or(Error::CollectableNotFound(collectable_id))?
        };
        let eligible = if snapshot.active && snapshot.is_gated() {
            Some(self.eligibility.check(
                &address,
                snapshot.required_year,
                snapshot.contract_address.as_deref(),
            )?)
        } else {
            None
        };

        self.redeem(&address, &snapshot, eligible)
    }

    /// Write phase of [`claim`](Self::claim), given the pre-lock snapshot and its gate result
    fn redeem(&self, address: &str, snapshot: &Collectable, eligible: Option<bool>) -> Result<CollectableClaim> {
        let collectable_id = snapshot.id;
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let collectable =
            find_collectable(&tx, collectable_id)?.ok_or(Error::CollectableNotFound(collectable_id))?;
        if !collectable.active {
            return Err(Error::CollectableInactive(collectable_id));
        }
        let user = find_by_address(&tx, address)?.ok_or_else(|| Error::UserNotFound(address.to_string()))?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM collectable_claims WHERE user_id = ?1 AND collectable_id = ?2",
                params![user.id, collectable_id],
                |r| r.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::CollectableAlreadyClaimed(collectable_id));
        }

        if collectable.is_gated() {
            // Unchecked if the gate changed or the snapshot was inactive
            let same_gate = snapshot.required_year == collectable.required_year
                && snapshot.contract_address == collectable.contract_address;
            if !(same_gate && eligible == Some(true)) {
                return Err(Error::CollectableNotEligible(collectable_id));
            }
        }

        let claimed_at = self.clock.now_ms();
        match tx.execute(
            "INSERT INTO collectable_claims (user_id, collectable_id, claimed_at) VALUES (?1, ?2, ?3)",
            params![user.id, collectable_id, claimed_at],
        ) {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::CollectableAlreadyClaimed(collectable_id));
            }
            Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "[guildhall:collectables] {} claimed collectable {} ({})",
            address, collectable_id, collectable.name
        );
        Ok(CollectableClaim {
            id,
            user_id: user.id,
            collectable_id,
            claimed_at,
        })
    }

    pub fn create(&self, new: &NewCollectable) -> Result<Collectable> {
        let conn = self.db.conn();
        insert_collectable(&conn, new, self.clock.now_ms())
    }
}
