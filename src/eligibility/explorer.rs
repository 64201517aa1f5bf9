//! Etherscan-compatible first-transaction lookup

use std::time::Duration;

use chrono::{DateTime, Datelike};
use serde::Deserialize;
use tracing::debug;

use super::ActivityOracle;
use crate::config::EligibilitySettings;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TxEntry {
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

/// Queries `module=account&action=txlist` for the oldest transaction
#[derive(Clone)]
pub struct ExplorerOracle {
    api_url: String,
    api_key: String,
    client: ureq::Agent,
}

impl ExplorerOracle {
    pub fn new(settings: &EligibilitySettings) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(settings.timeout_secs))
            .build();

        Self {
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            client,
        }
    }
}

impl ActivityOracle for ExplorerOracle {
    fn first_activity_year(&self, address: &str, contract: Option<&str>) -> Result<Option<i32>> {
        let (action, contract) = match contract {
            Some(c) => ("tokentx", c),
            None => ("txlist", ""),
        };

        let mut request = self
            .client
            .get(&self.api_url)
            .query("module", "account")
            .query("action", action)
            .query("address", address)
            .query("startblock", "0")
            .query("sort", "asc")
            .query("page", "1")
            .query("offset", "1");
        if !contract.is_empty() {
            request = request.query("contractaddress", contract);
        }
        if !self.api_key.is_empty() {
            request = request.query("apikey", &self.api_key);
        }

        let response: TxListResponse = request
            .call()
            .map_err(|e| Error::Lookup(format!("explorer request failed: {e}")))?
            .into_json()
            .map_err(|e| Error::Lookup(format!("explorer response unreadable: {e}")))?;

        let year = parse_first_year(response)?;
        debug!(
            "[guildhall:eligibility] {} first activity{}: {:?}",
            address,
            if contract.is_empty() { String::new() } else { format!(" on {contract}") },
            year
        );
        Ok(year)
    }
}

fn parse_first_year(response: TxListResponse) -> Result<Option<i32>> {
    if response.status != "1" {
        // The explorer reports an empty history as an error status
        if response.message.starts_with("No transactions found") {
            return Ok(None);
        }
        return Err(Error::Lookup(format!(
            "explorer error: {} ({})",
            response.message, response.result
        )));
    }

    let entries: Vec<TxEntry> = serde_json::from_value(response.result)
        .map_err(|e| Error::Lookup(format!("unexpected txlist shape: {e}")))?;
    let Some(first) = entries.first() else {
        return Ok(None);
    };

    let secs: i64 = first
        .time_stamp
        .parse()
        .map_err(|_| Error::Lookup(format!("bad timeStamp: {}", first.time_stamp)))?;
    let dt = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::Lookup(format!("timeStamp out of range: {secs}")))?;
    Ok(Some(dt.year()))
}
