//! Claim ledger: coin-funded reward redemption
//!
//! A (user, reward) pair moves from unclaimed to claimed exactly once. All
//! checks and all three writes (claim row, coin debit, claimed counter) run in
//! one `BEGIN IMMEDIATE` transaction, and every write is additionally guarded
//! in SQL, so two processes racing on the last unit cannot both win.

use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info};

use super::catalog::find_reward;
use crate::clock::Clock;
use crate::domain::{Claim, normalize_address};
use crate::eligibility::EligibilityResolver;
use crate::error::{ClaimError, Error};
use crate::store::users::find_by_address;
use crate::store::{Db, is_constraint_violation};

pub struct ClaimLedger<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
    eligibility: &'a EligibilityResolver,
}

impl<'a> ClaimLedger<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock, eligibility: &'a EligibilityResolver) -> Self {
        Self {
            db,
            clock,
            eligibility,
        }
    }

    /// Redeem a reward for the user at `address`
    ///
    /// Checks, in order: reward exists, is active, user exists, not already
    /// claimed, not sold out, enough coins, wallet eligibility.
    pub fn claim(&self, address: &str, reward_id: i64) -> Result<Claim, ClaimError> {
        let address = normalize_address(address)?;

        // Eligibility may hit the network, so resolve it before taking the write lock
        let snapshot = {
            let conn = self.db.conn();
            find_reward(&conn, reward_id)?.ok_or(ClaimError::RewardNotFound(reward_id))?
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

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let reward = find_reward(&tx, reward_id)?.ok_or(ClaimError::RewardNotFound(reward_id))?;
        if !reward.active {
            return Err(ClaimError::RewardInactive(reward_id));
        }

        let user = find_by_address(&tx, &address)?.ok_or_else(|| Error::UserNotFound(address.clone()))?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM claims WHERE user_id = ?1 AND reward_id = ?2",
                params![user.id, reward_id],
                |r| r.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(ClaimError::AlreadyClaimed(reward_id));
        }

        if reward.is_exhausted() {
            return Err(ClaimError::RewardExhausted(reward_id));
        }

        if user.coins < reward.price {
            debug!(
                "[guildhall:shop] {} cannot afford reward {} ({} < {})",
                address, reward_id, user.coins, reward.price
            );
            return Err(ClaimError::InsufficientCoins {
                price: reward.price,
                balance: user.coins,
            });
        }

        if reward.is_gated() {
            // A gate edited between the snapshot and now was never checked
            let same_gate = snapshot.required_year == reward.required_year
                && snapshot.contract_address == reward.contract_address;
            if !(same_gate && eligible == Some(true)) {
                return Err(ClaimError::NotEligible(reward_id));
            }
        }

        let bumped = tx.execute(
            "UPDATE rewards SET claimed = claimed + 1
             WHERE id = ?1 AND active = 1 AND claimed < total_available",
            params![reward_id],
        )?;
        if bumped == 0 {
            return Err(ClaimError::RewardExhausted(reward_id));
        }

        let debited = tx.execute(
            "UPDATE users SET coins = coins - ?1 WHERE id = ?2 AND coins >= ?1",
            params![reward.price, user.id],
        )?;
        if debited == 0 {
            return Err(ClaimError::InsufficientCoins {
                price: reward.price,
                balance: user.coins,
            });
        }

        let claimed_at = self.clock.now_ms();
        match tx.execute(
            "INSERT INTO claims (user_id, reward_id, coins_spent, claimed_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, reward_id, reward.price, claimed_at],
        ) {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(ClaimError::AlreadyClaimed(reward_id));
            }
            Err(e) => return Err(e.into()),
        }
        let claim_id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "[guildhall:shop] {} claimed reward {} ({}) for {} coins",
            address, reward_id, reward.name, reward.price
        );

        Ok(Claim {
            id: claim_id,
            user_id: user.id,
            reward_id,
            coins_spent: Some(reward.price),
            claimed_at,
        })
    }

    /// All claims of a user, newest first
    pub fn claims_for(&self, address: &str) -> Result<Vec<Claim>, Error> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        let Some(user) = find_by_address(&conn, &address)? else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM claims WHERE user_id = ?1 ORDER BY claimed_at DESC, id DESC",
            Claim::COLUMNS
        ))?;
        let claims = stmt
            .query_map(params![user.id], Claim::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(claims)
    }
}
