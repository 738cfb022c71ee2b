use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(json)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub const RESERVED: &'static [&'static str] = &["_id", "createdAt"];
}

/// Written by an external producer; the API only lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(json)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}
