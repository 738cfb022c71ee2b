use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(rename = "_id")]
    pub id: i64,
    pub crop: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PredictionRequest {
    pub const DEFAULT_CROP: &'static str = "general";
    pub const REQUESTED: &'static str = "requested";

    /// Non-empty strings are kept; anything else falls back to `"general"`.
    pub fn crop_or_default(crop: Option<&str>) -> String {
        match crop {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => Self::DEFAULT_CROP.to_string(),
        }
    }
}
