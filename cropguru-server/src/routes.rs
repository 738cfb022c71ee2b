//! Route handlers.
//!
//! Each endpoint has a thin axum handler that delegates to an inner function
//! taking the store (and random source) directly, so the behavior can be
//! exercised without the router. Every inner function makes at most one
//! store call.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use cropguru_core::models::action::ACTION_RESERVED;
use cropguru_core::models::{
    free_form, ChatMessage, DiseaseAnalysis, NewChatMessage, NewDiseaseAnalysis, Notification,
    PredictionRequest, Task,
};
use cropguru_core::{DocumentStore, RandomSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::body::{str_field, JsonBody};
use crate::error::AppError;
use crate::http::HttpState;

pub const CHAT_HISTORY_LIMIT: i64 = 50;
pub const TASKS_LIMIT: i64 = 100;
pub const NOTIFICATIONS_LIMIT: i64 = 100;
pub const PREDICTIONS_LIMIT: i64 = 50;
pub const DISEASE_HISTORY_LIMIT: i64 = 50;
pub const DEFAULT_FORECAST_DAYS: usize = 30;

// ============================================================================
// Response DTOs
// ============================================================================

/// `{ "ok": true }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRequested {
    pub ok: bool,
    pub request: PredictionRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: usize,
    pub rain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<String>,
}

// ============================================================================
// Inner functions
// ============================================================================

pub fn health_inner() -> Ack {
    Ack::ok()
}

pub async fn list_chat_inner(store: &dyn DocumentStore) -> Result<Vec<ChatMessage>, AppError> {
    Ok(store.list_messages(CHAT_HISTORY_LIMIT).await?)
}

pub async fn create_chat_inner(
    store: &dyn DocumentStore,
    body: &Map<String, Value>,
) -> Result<ChatMessage, AppError> {
    let new = NewChatMessage {
        message: body.get("message").cloned(),
        language: body.get("language").cloned(),
    };
    Ok(store.insert_message(new).await?)
}

pub async fn list_tasks_inner(store: &dyn DocumentStore) -> Result<Vec<Task>, AppError> {
    Ok(store.list_tasks(TASKS_LIMIT).await?)
}

pub async fn create_task_inner(
    store: &dyn DocumentStore,
    body: Map<String, Value>,
) -> Result<Task, AppError> {
    Ok(store.insert_task(free_form(body, Task::RESERVED)).await?)
}

pub async fn list_notifications_inner(
    store: &dyn DocumentStore,
) -> Result<Vec<Notification>, AppError> {
    Ok(store.list_notifications(NOTIFICATIONS_LIMIT).await?)
}

pub async fn list_predictions_inner(
    store: &dyn DocumentStore,
) -> Result<Vec<PredictionRequest>, AppError> {
    Ok(store.list_prediction_requests(PREDICTIONS_LIMIT).await?)
}

pub async fn request_yield_inner(
    store: &dyn DocumentStore,
    body: &Map<String, Value>,
) -> Result<YieldRequested, AppError> {
    let crop = PredictionRequest::crop_or_default(str_field(body, "crop"));
    let request = store.insert_prediction_request(crop).await?;
    Ok(YieldRequested { ok: true, request })
}

pub async fn schedule_irrigation_inner(
    store: &dyn DocumentStore,
    body: Map<String, Value>,
) -> Result<Ack, AppError> {
    let action = store.insert_action(free_form(body, ACTION_RESERVED)).await?;
    tracing::debug!("Irrigation scheduled, action id: {}", action.id);
    Ok(Ack::ok())
}

pub async fn weather_alert_inner(
    store: &dyn DocumentStore,
    body: Map<String, Value>,
) -> Result<Ack, AppError> {
    let alert = store.insert_alert(free_form(body, ACTION_RESERVED)).await?;
    tracing::debug!("Weather alert set, alert id: {}", alert.id);
    Ok(Ack::ok())
}

pub async fn analyze_field_inner(store: &dyn DocumentStore) -> Result<Ack, AppError> {
    store.insert_field_analysis().await?;
    Ok(Ack::ok())
}

/// Absent or empty → 30. Otherwise numeric coercion the way the dashboard's
/// JavaScript `Number()` reads a string: `0x`/`0o`/`0b` integer literals and
/// `Infinity` are accepted, `inf` and `nan` are not. Unparseable, NaN or
/// negative → 0, fractions truncate, anything above `max_days` clamps.
pub fn parse_forecast_days(raw: Option<&str>, max_days: usize) -> usize {
    let raw = match raw {
        None => return DEFAULT_FORECAST_DAYS.min(max_days),
        Some(r) if r.is_empty() => return DEFAULT_FORECAST_DAYS.min(max_days),
        Some(r) => r,
    };
    match coerce_number(raw) {
        n if n.is_nan() || n < 1.0 => 0,
        n if n >= max_days as f64 => max_days,
        n => n.trunc() as usize,
    }
}

fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    let prefixed = s.get(..2).map(str::to_ascii_lowercase);
    let radix = match prefixed.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf", "infinity" and "nan" in any case.
    if s.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Not persisted. `rain` is drawn independently per day.
pub fn forecast_inner(days: usize, random: &dyn RandomSource) -> Forecast {
    Forecast {
        days: (1..=days)
            .map(|day| ForecastDay {
                day,
                rain: random.rain(),
            })
            .collect(),
    }
}

pub async fn set_location_inner(
    store: &dyn DocumentStore,
    body: &Map<String, Value>,
) -> Result<Ack, AppError> {
    let location = body.get("location").cloned();
    store.upsert_location(location).await?;
    Ok(Ack::ok())
}

pub async fn list_disease_history_inner(
    store: &dyn DocumentStore,
) -> Result<Vec<DiseaseAnalysis>, AppError> {
    Ok(store.list_disease_analyses(DISEASE_HISTORY_LIMIT).await?)
}

pub async fn analyze_disease_inner(
    store: &dyn DocumentStore,
    random: &dyn RandomSource,
    body: &Map<String, Value>,
) -> Result<DiseaseAnalysis, AppError> {
    let new = NewDiseaseAnalysis {
        image_length: NewDiseaseAnalysis::image_length_of(str_field(body, "imageBase64")),
        healthy: random.healthy(),
    };
    Ok(store.insert_disease_analysis(new).await?)
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

type Shared = State<Arc<HttpState>>;

pub async fn health_handler() -> Json<Ack> {
    Json(health_inner())
}

pub async fn list_chat_handler(State(state): Shared) -> Result<Json<Vec<ChatMessage>>, AppError> {
    list_chat_inner(state.store.as_ref()).await.map(Json)
}

pub async fn create_chat_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<ChatMessage>, AppError> {
    create_chat_inner(state.store.as_ref(), &body).await.map(Json)
}

pub async fn list_tasks_handler(State(state): Shared) -> Result<Json<Vec<Task>>, AppError> {
    list_tasks_inner(state.store.as_ref()).await.map(Json)
}

pub async fn create_task_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<Task>, AppError> {
    create_task_inner(state.store.as_ref(), body).await.map(Json)
}

pub async fn list_notifications_handler(
    State(state): Shared,
) -> Result<Json<Vec<Notification>>, AppError> {
    list_notifications_inner(state.store.as_ref()).await.map(Json)
}

pub async fn list_predictions_handler(
    State(state): Shared,
) -> Result<Json<Vec<PredictionRequest>>, AppError> {
    list_predictions_inner(state.store.as_ref()).await.map(Json)
}

pub async fn request_yield_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<YieldRequested>, AppError> {
    request_yield_inner(state.store.as_ref(), &body).await.map(Json)
}

pub async fn schedule_irrigation_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<Ack>, AppError> {
    schedule_irrigation_inner(state.store.as_ref(), body).await.map(Json)
}

pub async fn weather_alert_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<Ack>, AppError> {
    weather_alert_inner(state.store.as_ref(), body).await.map(Json)
}

pub async fn analyze_field_handler(State(state): Shared) -> Result<Json<Ack>, AppError> {
    analyze_field_inner(state.store.as_ref()).await.map(Json)
}

pub async fn forecast_handler(
    State(state): Shared,
    Query(query): Query<ForecastQuery>,
) -> Json<Forecast> {
    let days = parse_forecast_days(query.days.as_deref(), state.forecast_max_days);
    Json(forecast_inner(days, state.random.as_ref()))
}

pub async fn set_location_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<Ack>, AppError> {
    set_location_inner(state.store.as_ref(), &body).await.map(Json)
}

pub async fn disease_history_handler(
    State(state): Shared,
) -> Result<Json<Vec<DiseaseAnalysis>>, AppError> {
    list_disease_history_inner(state.store.as_ref()).await.map(Json)
}

pub async fn analyze_disease_handler(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> Result<Json<DiseaseAnalysis>, AppError> {
    analyze_disease_inner(state.store.as_ref(), state.random.as_ref(), &body)
        .await
        .map(Json)
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cropguru_core::{MemoryStore, SequenceRandom};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_parse_forecast_days_defaults() {
        assert_eq!(parse_forecast_days(None, 3650), 30);
        assert_eq!(parse_forecast_days(Some(""), 3650), 30);
    }

    #[test]
    fn test_parse_forecast_days_numeric_coercion() {
        assert_eq!(parse_forecast_days(Some("7"), 3650), 7);
        assert_eq!(parse_forecast_days(Some(" 7 "), 3650), 7);
        assert_eq!(parse_forecast_days(Some("2.9"), 3650), 2);
        assert_eq!(parse_forecast_days(Some("0"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("-4"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("abc"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("NaN"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("   "), 3650), 0);
    }

    #[test]
    fn test_parse_forecast_days_clamps() {
        assert_eq!(parse_forecast_days(Some("100000"), 3650), 3650);
        assert_eq!(parse_forecast_days(Some("Infinity"), 365), 365);
        assert_eq!(parse_forecast_days(Some("+Infinity"), 365), 365);
        assert_eq!(parse_forecast_days(None, 10), 10);
    }

    #[test]
    fn test_parse_forecast_days_radix_prefixes() {
        assert_eq!(parse_forecast_days(Some("0x10"), 3650), 16);
        assert_eq!(parse_forecast_days(Some("0XfF"), 3650), 255);
        assert_eq!(parse_forecast_days(Some("0b1"), 3650), 1);
        assert_eq!(parse_forecast_days(Some("0o7"), 3650), 7);
        assert_eq!(parse_forecast_days(Some(" 0x10 "), 3650), 16);
        assert_eq!(parse_forecast_days(Some("0x"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("0b2"), 3650), 0);
        assert_eq!(parse_forecast_days(Some("-0x10"), 3650), 0);
    }

    #[test]
    fn test_parse_forecast_days_rejects_non_js_spellings() {
        assert_eq!(parse_forecast_days(Some("inf"), 365), 0);
        assert_eq!(parse_forecast_days(Some("infinity"), 365), 0);
        assert_eq!(parse_forecast_days(Some("-Infinity"), 365), 0);
        assert_eq!(parse_forecast_days(Some("nan"), 365), 0);
        assert_eq!(parse_forecast_days(Some("1e2"), 365), 100);
    }

    #[test]
    fn test_forecast_days_in_order_with_injected_rain() {
        let random = SequenceRandom::new(vec![0.1, 0.8]);
        let forecast = forecast_inner(4, &random);
        let days: Vec<usize> = forecast.days.iter().map(|d| d.day).collect();
        let rain: Vec<bool> = forecast.days.iter().map(|d| d.rain).collect();
        assert_eq!(days, vec![1, 2, 3, 4]);
        assert_eq!(rain, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_create_chat_sets_kind_user() {
        let store = MemoryStore::new();
        let body = object(json!({"message": "hi", "language": "English", "extra": 1}));
        let stored = create_chat_inner(&store, &body).await.unwrap();
        assert_eq!(stored.message, Some(json!("hi")));
        assert_eq!(stored.language, Some(json!("English")));
        assert_eq!(stored.kind, "user");
    }

    #[tokio::test]
    async fn test_create_chat_keeps_non_string_values() {
        let store = MemoryStore::new();
        let body = object(json!({"message": 42, "language": {"code": "sw"}}));
        let stored = create_chat_inner(&store, &body).await.unwrap();
        assert_eq!(stored.message, Some(json!(42)));
        assert_eq!(stored.language, Some(json!({"code": "sw"})));
    }

    #[tokio::test]
    async fn test_create_chat_missing_fields_are_not_rejected() {
        let store = MemoryStore::new();
        let stored = create_chat_inner(&store, &Map::new()).await.unwrap();
        assert!(stored.message.is_none());
        assert!(stored.language.is_none());
    }

    #[tokio::test]
    async fn test_request_yield_defaults_crop() {
        let store = MemoryStore::new();
        let resp = request_yield_inner(&store, &Map::new()).await.unwrap();
        assert!(resp.ok);
        assert_eq!(resp.request.crop, "general");
        assert_eq!(resp.request.status, "requested");

        let listed = list_predictions_inner(&store).await.unwrap();
        assert_eq!(listed[0], resp.request);
    }

    #[tokio::test]
    async fn test_irrigation_keeps_server_kind() {
        let store = MemoryStore::new();
        let body = object(json!({"crop": "rice", "kind": "drain", "litres": 400}));
        let ack = schedule_irrigation_inner(&store, body).await.unwrap();
        assert!(ack.ok);

        let actions = store.actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, "irrigation");
        assert_eq!(actions[0].fields["crop"], "rice");
        assert_eq!(actions[0].fields["litres"], 400);
        assert!(!actions[0].fields.contains_key("kind"));
    }

    #[tokio::test]
    async fn test_weather_alert_stored_with_kind() {
        let store = MemoryStore::new();
        let body = object(json!({"threshold": "storm"}));
        weather_alert_inner(&store, body).await.unwrap();

        let alerts = store.alerts().unwrap();
        assert_eq!(alerts[0].kind, "weather");
        assert_eq!(alerts[0].fields["threshold"], "storm");
    }

    #[tokio::test]
    async fn test_analyze_field_records_started() {
        let store = MemoryStore::new();
        analyze_field_inner(&store).await.unwrap();
        let analyses = store.field_analyses().unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].status, "started");
    }

    #[tokio::test]
    async fn test_analyze_disease_uses_injected_source() {
        let store = MemoryStore::new();
        let random = SequenceRandom::new(vec![0.9, 0.2]);

        let body = object(json!({"imageBase64": "aGVsbG8="}));
        let first = analyze_disease_inner(&store, &random, &body).await.unwrap();
        assert_eq!(first.image_length, 8);
        assert!(first.result.healthy);

        let second = analyze_disease_inner(&store, &random, &Map::new())
            .await
            .unwrap();
        assert_eq!(second.image_length, 0);
        assert!(!second.result.healthy);
        assert_eq!(second.status, "analyzed");
    }

    #[tokio::test]
    async fn test_set_location_keeps_any_json_value() {
        let store = MemoryStore::new();
        let body = object(json!({"location": {"lat": -0.3, "lng": 36.1}}));
        set_location_inner(&store, &body).await.unwrap();
        let settings = store.settings().unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].location, Some(json!({"lat": -0.3, "lng": 36.1})));

        set_location_inner(&store, &Map::new()).await.unwrap();
        assert!(store.settings().unwrap()[0].location.is_none());
    }
}
