use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAnalysis {
    #[serde(rename = "_id")]
    pub id: i64,
    pub image_length: i64,
    pub status: String,
    #[sqlx(flatten)]
    pub result: DiseaseResult,
    pub created_at: DateTime<Utc>,
}

impl DiseaseAnalysis {
    pub const ANALYZED: &'static str = "analyzed";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DiseaseResult {
    pub healthy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewDiseaseAnalysis {
    pub image_length: i64,
    pub healthy: bool,
}

impl NewDiseaseAnalysis {
    /// Character length of the encoded image, 0 when absent or empty.
    pub fn image_length_of(image_base64: Option<&str>) -> i64 {
        image_base64.map_or(0, |s| s.chars().count() as i64)
    }
}
