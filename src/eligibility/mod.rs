//! Wallet-history eligibility for gated rewards and collectables
//!
//! Gated items carry a `required_year` and/or a `contract_address`. A wallet
//! qualifies when its first transaction (against the contract, if one is set)
//! happened in exactly the required year; with only a contract set, any
//! interaction with it qualifies.

mod explorer;

pub use explorer::ExplorerOracle;

use std::collections::HashMap;
use std::sync::Arc;

use rusqlite::params;
use tracing::debug;

use crate::error::Result;
use crate::store::Db;
use crate::store::users::find_by_address;

/// Source of first-transaction data
pub trait ActivityOracle: Send + Sync {
    /// UTC year of the wallet's first transaction, `None` if it has none
    fn first_activity_year(&self, address: &str, contract: Option<&str>) -> Result<Option<i32>>;
}

/// Fixed answers, for tests and offline deployments
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    years: HashMap<(String, Option<String>), i32>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, address: &str, year: i32) -> Self {
        self.years.insert((address.to_ascii_lowercase(), None), year);
        self
    }

    pub fn with_contract_year(mut self, address: &str, contract: &str, year: i32) -> Self {
        self.years.insert(
            (address.to_ascii_lowercase(), Some(contract.to_ascii_lowercase())),
            year,
        );
        self
    }
}

impl ActivityOracle for StaticOracle {
    fn first_activity_year(&self, address: &str, contract: Option<&str>) -> Result<Option<i32>> {
        let key = (
            address.to_ascii_lowercase(),
            contract.map(|c| c.to_ascii_lowercase()),
        );
        Ok(self.years.get(&key).copied())
    }
}

/// Whether a wallet with first-activity `year` passes the gate
pub fn gate_matches(required_year: Option<i32>, contract: Option<&str>, year: Option<i32>) -> bool {
    match (required_year, contract, year) {
        (None, None, _) => true,
        (Some(required), _, Some(actual)) => actual == required,
        (None, Some(_), Some(_)) => true,
        (_, _, None) => false,
    }
}

/// Oracle lookups with the contract-less answer cached on the user row
#[derive(Clone)]
pub struct EligibilityResolver {
    db: Db,
    oracle: Arc<dyn ActivityOracle>,
}

impl EligibilityResolver {
    pub fn new(db: Db, oracle: Arc<dyn ActivityOracle>) -> Self {
        Self { db, oracle }
    }

    /// First-activity year for a canonical address
    pub fn first_activity_year(&self, address: &str, contract: Option<&str>) -> Result<Option<i32>> {
        if contract.is_none() {
            let conn = self.db.conn();
            if let Some(year) = find_by_address(&conn, address)?.and_then(|u| u.first_activity_year) {
                return Ok(Some(year));
            }
        }

        // Network call happens without holding the connection
        let year = self.oracle.first_activity_year(address, contract)?;

        if let (None, Some(year)) = (contract, year) {
            let conn = self.db.conn();
            conn.execute(
                "UPDATE users SET first_activity_year = ?1 WHERE address = ?2",
                params![year, address],
            )?;
            debug!("[guildhall:eligibility] cached first activity {} for {}", year, address);
        }
        Ok(year)
    }

    /// Evaluate a gate for a canonical address
    pub fn check(&self, address: &str, required_year: Option<i32>, contract: Option<&str>) -> Result<bool> {
        if required_year.is_none() && contract.is_none() {
            return Ok(true);
        }
        let year = self.first_activity_year(address, contract)?;
        Ok(gate_matches(required_year, contract, year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const ADDR: &str = "0x00000000000000000000000000000000000000aa";

    struct CountingOracle {
        calls: AtomicUsize,
    }

    impl ActivityOracle for CountingOracle {
        fn first_activity_year(&self, _address: &str, _contract: Option<&str>) -> Result<Option<i32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(2019))
        }
    }

    #[test]
    fn test_gate_matches() {
        assert!(gate_matches(None, None, None));
        assert!(gate_matches(Some(2019), None, Some(2019)));
        assert!(!gate_matches(Some(2019), None, Some(2020)));
        assert!(!gate_matches(Some(2019), None, None));
        assert!(gate_matches(None, Some("0xc0ffee"), Some(2022)));
        assert!(!gate_matches(None, Some("0xc0ffee"), None));
    }

    #[test]
    fn test_resolver_caches_plain_lookup() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        db.conn()
            .execute("INSERT INTO users (address, created_at) VALUES (?1, 0)", params![ADDR])
            .unwrap();

        let oracle = Arc::new(CountingOracle {
            calls: AtomicUsize::new(0),
        });
        let resolver = EligibilityResolver::new(db.clone(), oracle.clone());

        assert_eq!(resolver.first_activity_year(ADDR, None).unwrap(), Some(2019));
        assert_eq!(resolver.first_activity_year(ADDR, None).unwrap(), Some(2019));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

        // Contract-scoped lookups are not cached
        resolver.first_activity_year(ADDR, Some("0xc0ffee")).unwrap();
        resolver.first_activity_year(ADDR, Some("0xc0ffee")).unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_static_oracle_is_case_insensitive() {
        let oracle = StaticOracle::new().with_contract_year("0xAA", "0xBEEF", 2021);
        assert_eq!(oracle.first_activity_year("0xaa", Some("0xbeef")).unwrap(), Some(2021));
        assert_eq!(oracle.first_activity_year("0xaa", None).unwrap(), None);
    }
}
