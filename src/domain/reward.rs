use serde::{Deserialize, Serialize};

/// A shop item bought with coins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Price in coins.
    ///
    /// Serialized and stored as `xpRequired` / `xp_required` for compatibility
    /// with existing clients; the "xp" in that name is historical. Buying a
    /// reward spends coins and never touches XP.
    #[serde(rename = "xpRequired")]
    pub price: u64,
    pub total_available: u64,
    pub claimed: u64,
    pub active: bool,
    pub contract_address: Option<String>,
    pub required_year: Option<i32>,
}

impl Reward {
    pub(crate) const COLUMNS: &'static str = "id, name, description, image_url, xp_required, \
         total_available, claimed, active, contract_address, required_year";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            price: row.get(4)?,
            total_available: row.get(5)?,
            claimed: row.get(6)?,
            active: row.get(7)?,
            contract_address: row.get(8)?,
            required_year: row.get(9)?,
        })
    }

    /// Units left to claim
    pub fn available(&self) -> u64 {
        self.total_available.saturating_sub(self.claimed)
    }

    pub fn is_exhausted(&self) -> bool {
        self.claimed >= self.total_available
    }

    /// Whether claiming needs an on-chain eligibility check
    pub fn is_gated(&self) -> bool {
        self.required_year.is_some() || self.contract_address.is_some()
    }
}

/// Reward definition used when seeding the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReward {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Price in coins (see [`Reward::price`])
    #[serde(rename = "xpRequired", alias = "price")]
    pub price: u64,
    pub total_available: u64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub required_year: Option<i32>,
}

fn default_active() -> bool {
    true
}

/// A reward as shown in the shop, with derived availability
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardView {
    #[serde(flatten)]
    pub reward: Reward,
    pub available: u64,
    pub has_claimed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward(total: u64, claimed: u64) -> Reward {
        Reward {
            id: 1,
            name: "Hoodie".into(),
            description: String::new(),
            image_url: None,
            price: 100,
            total_available: total,
            claimed,
            active: true,
            contract_address: None,
            required_year: None,
        }
    }

    #[test]
    fn test_available_never_negative() {
        assert_eq!(reward(5, 2).available(), 3);
        assert_eq!(reward(5, 5).available(), 0);
        assert_eq!(reward(1, 3).available(), 0);
        assert!(reward(5, 5).is_exhausted());
    }

    #[test]
    fn test_price_serializes_under_legacy_name() {
        let json = serde_json::to_value(reward(5, 0)).unwrap();
        assert_eq!(json["xpRequired"], 100);
        assert!(json.get("price").is_none());
    }

    #[test]
    fn test_new_reward_accepts_price_alias() {
        let parsed: NewReward =
            serde_json::from_str(r#"{"name":"Cap","price":40,"totalAvailable":3}"#).unwrap();
        assert_eq!(parsed.price, 40);
        assert!(parsed.active);
    }
}
