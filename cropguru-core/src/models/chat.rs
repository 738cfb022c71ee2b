use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message posted to the assistant chat. `kind` is always `"user"` for
/// messages created over the API.
///
/// `message` and `language` hold whatever JSON the caller sent, so a number or
/// an object comes back exactly as posted. An absent key stays absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub const USER_KIND: &'static str = "user";
}

#[derive(Debug, Clone, Default)]
pub struct NewChatMessage {
    pub message: Option<Value>,
    pub language: Option<Value>,
}
