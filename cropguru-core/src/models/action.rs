use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scheduled irrigation action, stored in `actions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationAction {
    #[serde(rename = "_id")]
    pub id: i64,
    pub kind: String,
    #[serde(flatten)]
    #[sqlx(json)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl IrrigationAction {
    pub const KIND: &'static str = "irrigation";
}

/// A weather alert subscription, stored in `alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    #[serde(rename = "_id")]
    pub id: i64,
    pub kind: String,
    #[serde(flatten)]
    #[sqlx(json)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl WeatherAlert {
    pub const KIND: &'static str = "weather";
}

/// Keys the server owns on both action kinds.
pub const ACTION_RESERVED: &[&str] = &["_id", "kind", "createdAt"];
