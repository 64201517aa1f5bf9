use serde::{Deserialize, Serialize};

/// A free cosmetic item gated by wallet history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectable {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub contract_address: Option<String>,
    pub required_year: Option<i32>,
}

impl Collectable {
    pub(crate) const COLUMNS: &'static str =
        "id, name, description, image_url, active, contract_address, required_year";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            active: row.get(4)?,
            contract_address: row.get(5)?,
            required_year: row.get(6)?,
        })
    }

    pub fn is_gated(&self) -> bool {
        self.required_year.is_some() || self.contract_address.is_some()
    }
}

/// Collectable definition used when seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollectable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectableClaim {
    pub id: i64,
    pub user_id: i64,
    pub collectable_id: i64,
    pub claimed_at: i64,
}

/// A collectable as listed for a (possibly anonymous) visitor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectableView {
    #[serde(flatten)]
    pub collectable: Collectable,
    pub has_claimed: bool,
    /// `None` when no address was given
    pub eligible: Option<bool>,
}
