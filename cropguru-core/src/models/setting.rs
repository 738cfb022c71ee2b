use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The farm location. Exactly one row exists, keyed by `key = "location"`.
/// `location` is stored as sent: a string, an object with coordinates, or
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocationSetting {
    pub key: String,
    pub location: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl LocationSetting {
    pub const KEY: &'static str = "location";
}
