use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;

use super::DocumentStore;
use crate::error::Result;
use crate::models::{
    ChatMessage, DiseaseAnalysis, FieldAnalysis, IrrigationAction, LocationSetting,
    NewChatMessage, NewDiseaseAnalysis, Notification, PredictionRequest, Task, WeatherAlert,
};

/// Postgres-backed store. Inserts use `RETURNING` so the caller sees exactly
/// what a later list call will read back.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> Result<String> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    async fn list_messages(&self, limit: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, message, language, kind, created_at FROM messages ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_message(&self, new: NewChatMessage) -> Result<ChatMessage> {
        let row = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO messages (message, language, kind)
            VALUES ($1, $2, $3)
            RETURNING id, message, language, kind, created_at
            "#,
        )
        .bind(new.message)
        .bind(new.language)
        .bind(ChatMessage::USER_KIND)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_tasks(&self, limit: i64) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT id, fields, created_at FROM tasks ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_task(&self, fields: Map<String, Value>) -> Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (fields) VALUES ($1) RETURNING id, fields, created_at",
        )
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT id, fields, created_at FROM notifications ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_prediction_requests(&self, limit: i64) -> Result<Vec<PredictionRequest>> {
        let rows = sqlx::query_as::<_, PredictionRequest>(
            "SELECT id, crop, status, created_at FROM prediction_requests ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_prediction_request(&self, crop: String) -> Result<PredictionRequest> {
        let row = sqlx::query_as::<_, PredictionRequest>(
            r#"
            INSERT INTO prediction_requests (crop, status)
            VALUES ($1, $2)
            RETURNING id, crop, status, created_at
            "#,
        )
        .bind(crop)
        .bind(PredictionRequest::REQUESTED)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_action(&self, fields: Map<String, Value>) -> Result<IrrigationAction> {
        let row = sqlx::query_as::<_, IrrigationAction>(
            "INSERT INTO actions (kind, fields) VALUES ($1, $2) RETURNING id, kind, fields, created_at",
        )
        .bind(IrrigationAction::KIND)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_alert(&self, fields: Map<String, Value>) -> Result<WeatherAlert> {
        let row = sqlx::query_as::<_, WeatherAlert>(
            "INSERT INTO alerts (kind, fields) VALUES ($1, $2) RETURNING id, kind, fields, created_at",
        )
        .bind(WeatherAlert::KIND)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_field_analysis(&self) -> Result<FieldAnalysis> {
        let row = sqlx::query_as::<_, FieldAnalysis>(
            "INSERT INTO field_analyses (status) VALUES ($1) RETURNING id, status, started_at",
        )
        .bind(FieldAnalysis::STARTED)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_location(&self, location: Option<Value>) -> Result<LocationSetting> {
        // clock_timestamp() rather than now() so back-to-back upserts inside
        // one transaction still advance.
        let row = sqlx::query_as::<_, LocationSetting>(
            r#"
            INSERT INTO settings (key, location, updated_at)
            VALUES ($1, $2, clock_timestamp())
            ON CONFLICT (key) DO UPDATE
            SET location = EXCLUDED.location,
                updated_at = GREATEST(EXCLUDED.updated_at, settings.updated_at + INTERVAL '1 microsecond')
            RETURNING key, location, updated_at
            "#,
        )
        .bind(LocationSetting::KEY)
        .bind(location)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_disease_analyses(&self, limit: i64) -> Result<Vec<DiseaseAnalysis>> {
        let rows = sqlx::query_as::<_, DiseaseAnalysis>(
            r#"
            SELECT id, image_length, status, healthy, created_at
            FROM analyses
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_disease_analysis(&self, new: NewDiseaseAnalysis) -> Result<DiseaseAnalysis> {
        let row = sqlx::query_as::<_, DiseaseAnalysis>(
            r#"
            INSERT INTO analyses (image_length, status, healthy)
            VALUES ($1, $2, $3)
            RETURNING id, image_length, status, healthy, created_at
            "#,
        )
        .bind(new.image_length)
        .bind(DiseaseAnalysis::ANALYZED)
        .bind(new.healthy)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

// ============================================================================
// Tests — require a live PostgreSQL; skipped when unavailable
// ============================================================================
