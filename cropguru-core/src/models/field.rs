use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalysis {
    #[serde(rename = "_id")]
    pub id: i64,
    pub status: String,
    pub started_at: DateTime<Utc>,
}

impl FieldAnalysis {
    pub const STARTED: &'static str = "started";
}
