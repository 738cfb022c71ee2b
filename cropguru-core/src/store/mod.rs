//! Persistence adapter.
//!
//! Each method is exactly one store round trip. List methods return at most
//! `limit` records, newest first by insertion id.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{
    ChatMessage, DiseaseAnalysis, FieldAnalysis, IrrigationAction, LocationSetting,
    NewChatMessage, NewDiseaseAnalysis, Notification, PredictionRequest, Task, WeatherAlert,
};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip to the backend; returns a short description of it.
    async fn ping(&self) -> Result<String>;

    async fn list_messages(&self, limit: i64) -> Result<Vec<ChatMessage>>;
    async fn insert_message(&self, new: NewChatMessage) -> Result<ChatMessage>;

    async fn list_tasks(&self, limit: i64) -> Result<Vec<Task>>;
    async fn insert_task(&self, fields: Map<String, Value>) -> Result<Task>;

    async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>>;

    async fn list_prediction_requests(&self, limit: i64) -> Result<Vec<PredictionRequest>>;
    async fn insert_prediction_request(&self, crop: String) -> Result<PredictionRequest>;

    async fn insert_action(&self, fields: Map<String, Value>) -> Result<IrrigationAction>;
    async fn insert_alert(&self, fields: Map<String, Value>) -> Result<WeatherAlert>;

    async fn insert_field_analysis(&self) -> Result<FieldAnalysis>;

    /// Insert or replace the single location setting. `updated_at` strictly
    /// increases across calls.
    async fn upsert_location(&self, location: Option<Value>) -> Result<LocationSetting>;

    async fn list_disease_analyses(&self, limit: i64) -> Result<Vec<DiseaseAnalysis>>;
    async fn insert_disease_analysis(&self, new: NewDiseaseAnalysis) -> Result<DiseaseAnalysis>;
}
