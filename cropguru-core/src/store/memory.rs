use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use super::DocumentStore;
use crate::error::{CropguruError, Result};
use crate::models::{
    ChatMessage, DiseaseAnalysis, DiseaseResult, FieldAnalysis, IrrigationAction,
    LocationSetting, NewChatMessage, NewDiseaseAnalysis, Notification, PredictionRequest, Task,
    WeatherAlert,
};

/// In-process store with the same ordering and upsert semantics as
/// [`super::PgStore`]. Ids come from one counter shared by all collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    last_id: i64,
    messages: Vec<ChatMessage>,
    tasks: Vec<Task>,
    notifications: Vec<Notification>,
    prediction_requests: Vec<PredictionRequest>,
    actions: Vec<IrrigationAction>,
    alerts: Vec<WeatherAlert>,
    field_analyses: Vec<FieldAnalysis>,
    settings: Vec<LocationSetting>,
    analyses: Vec<DiseaseAnalysis>,
}

impl Collections {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn newest<T: Clone>(items: &[T], limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    items.iter().rev().take(limit).cloned().collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| CropguruError::Other("memory store lock poisoned".to_string()))
    }

    /// Stand-in for the external producer that writes notifications.
    pub fn push_notification(&self, fields: Map<String, Value>) -> Result<Notification> {
        let mut c = self.lock()?;
        let notification = Notification {
            id: c.next_id(),
            fields,
            created_at: Utc::now(),
        };
        c.notifications.push(notification.clone());
        Ok(notification)
    }

    pub fn settings(&self) -> Result<Vec<LocationSetting>> {
        Ok(self.lock()?.settings.clone())
    }

    pub fn actions(&self) -> Result<Vec<IrrigationAction>> {
        Ok(self.lock()?.actions.clone())
    }

    pub fn alerts(&self) -> Result<Vec<WeatherAlert>> {
        Ok(self.lock()?.alerts.clone())
    }

    pub fn field_analyses(&self) -> Result<Vec<FieldAnalysis>> {
        Ok(self.lock()?.field_analyses.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<String> {
        let _guard = self.lock()?;
        Ok("memory".to_string())
    }

    async fn list_messages(&self, limit: i64) -> Result<Vec<ChatMessage>> {
        Ok(newest(&self.lock()?.messages, limit))
    }

    async fn insert_message(&self, new: NewChatMessage) -> Result<ChatMessage> {
        let mut c = self.lock()?;
        let message = ChatMessage {
            id: c.next_id(),
            message: new.message,
            language: new.language,
            kind: ChatMessage::USER_KIND.to_string(),
            created_at: Utc::now(),
        };
        c.messages.push(message.clone());
        Ok(message)
    }

    async fn list_tasks(&self, limit: i64) -> Result<Vec<Task>> {
        Ok(newest(&self.lock()?.tasks, limit))
    }

    async fn insert_task(&self, fields: Map<String, Value>) -> Result<Task> {
        let mut c = self.lock()?;
        let task = Task {
            id: c.next_id(),
            fields,
            created_at: Utc::now(),
        };
        c.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>> {
        Ok(newest(&self.lock()?.notifications, limit))
    }

    async fn list_prediction_requests(&self, limit: i64) -> Result<Vec<PredictionRequest>> {
        Ok(newest(&self.lock()?.prediction_requests, limit))
    }

    async fn insert_prediction_request(&self, crop: String) -> Result<PredictionRequest> {
        let mut c = self.lock()?;
        let request = PredictionRequest {
            id: c.next_id(),
            crop,
            status: PredictionRequest::REQUESTED.to_string(),
            created_at: Utc::now(),
        };
        c.prediction_requests.push(request.clone());
        Ok(request)
    }

    async fn insert_action(&self, fields: Map<String, Value>) -> Result<IrrigationAction> {
        let mut c = self.lock()?;
        let action = IrrigationAction {
            id: c.next_id(),
            kind: IrrigationAction::KIND.to_string(),
            fields,
            created_at: Utc::now(),
        };
        c.actions.push(action.clone());
        Ok(action)
    }

    async fn insert_alert(&self, fields: Map<String, Value>) -> Result<WeatherAlert> {
        let mut c = self.lock()?;
        let alert = WeatherAlert {
            id: c.next_id(),
            kind: WeatherAlert::KIND.to_string(),
            fields,
            created_at: Utc::now(),
        };
        c.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn insert_field_analysis(&self) -> Result<FieldAnalysis> {
        let mut c = self.lock()?;
        let analysis = FieldAnalysis {
            id: c.next_id(),
            status: FieldAnalysis::STARTED.to_string(),
            started_at: Utc::now(),
        };
        c.field_analyses.push(analysis.clone());
        Ok(analysis)
    }

    async fn upsert_location(&self, location: Option<Value>) -> Result<LocationSetting> {
        let mut c = self.lock()?;
        let now = Utc::now();
        if let Some(existing) = c.settings.iter_mut().find(|s| s.key == LocationSetting::KEY) {
            existing.location = location;
            existing.updated_at = advance(existing.updated_at, now);
            return Ok(existing.clone());
        }

        let setting = LocationSetting {
            key: LocationSetting::KEY.to_string(),
            location,
            updated_at: now,
        };
        c.settings.push(setting.clone());
        Ok(setting)
    }

    async fn list_disease_analyses(&self, limit: i64) -> Result<Vec<DiseaseAnalysis>> {
        Ok(newest(&self.lock()?.analyses, limit))
    }

    async fn insert_disease_analysis(&self, new: NewDiseaseAnalysis) -> Result<DiseaseAnalysis> {
        let mut c = self.lock()?;
        let analysis = DiseaseAnalysis {
            id: c.next_id(),
            image_length: new.image_length,
            status: DiseaseAnalysis::ANALYZED.to_string(),
            result: DiseaseResult {
                healthy: new.healthy,
            },
            created_at: Utc::now(),
        };
        c.analyses.push(analysis.clone());
        Ok(analysis)
    }
}

/// `now`, or one microsecond past `previous` if the clock has not moved on.
fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + Duration::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_is_newest_first_and_capped() {
        let store = MemoryStore::new();
        for i in 0..60 {
            store
                .insert_message(NewChatMessage {
                    message: Some(Value::String(format!("m{}", i))),
                    language: None,
                })
                .await
                .unwrap();
        }

        let listed = store.list_messages(50).await.unwrap();
        assert_eq!(listed.len(), 50);
        assert_eq!(listed[0].message, Some(json!("m59")));
        assert_eq!(listed[49].message, Some(json!("m10")));
        assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn test_ids_are_shared_across_collections() {
        let store = MemoryStore::new();
        let task = store.insert_task(Map::new()).await.unwrap();
        let request = store
            .insert_prediction_request("maize".to_string())
            .await
            .unwrap();
        assert!(request.id > task.id);
    }

    #[tokio::test]
    async fn test_upsert_location_single_row_strictly_increasing() {
        let store = MemoryStore::new();
        let first = store
            .upsert_location(Some(json!("Kisumu")))
            .await
            .unwrap();
        let second = store
            .upsert_location(Some(json!("Meru")))
            .await
            .unwrap();

        let settings = store.settings().unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].location, Some(json!("Meru")));
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn test_advance_never_goes_backwards() {
        let previous = Utc::now();
        let earlier = previous - Duration::seconds(5);
        assert_eq!(advance(previous, earlier), previous + Duration::microseconds(1));
        let later = previous + Duration::seconds(1);
        assert_eq!(advance(previous, later), later);
    }

    #[tokio::test]
    async fn test_notifications_are_listed_after_push() {
        let store = MemoryStore::new();
        let fields = json!({"title": "Frost tonight"});
        let pushed = store
            .push_notification(fields.as_object().unwrap().clone())
            .unwrap();
        let listed = store.list_notifications(100).await.unwrap();
        assert_eq!(listed, vec![pushed]);
    }

    #[tokio::test]
    async fn test_zero_or_negative_limit_is_empty() {
        let store = MemoryStore::new();
        store.insert_task(Map::new()).await.unwrap();
        assert!(store.list_tasks(0).await.unwrap().is_empty());
        assert!(store.list_tasks(-1).await.unwrap().is_empty());
    }
}
