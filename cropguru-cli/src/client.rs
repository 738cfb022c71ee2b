//! Thin client for the CropGuru REST API.
//!
//! One method per dashboard call. Every request carries a JSON content type;
//! a non-2xx status becomes an error whose message is the raw response body.
//! There is no timeout, no retry and no cancellation.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:4000/api";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Display is the response body text, unmodified.
    #[error("{body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(ClientError::Status { status, body });
        }
        Ok(resp.json().await?)
    }

    async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        self.request(Method::POST, path, body).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get("/health").await
    }

    pub async fn post_chat_message(
        &self,
        message: &str,
        language: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            "/chat",
            Some(&json!({"message": message, "language": language})),
        )
        .await
    }

    pub async fn fetch_chat_history(&self) -> Result<Value, ClientError> {
        self.get("/chat").await
    }

    pub async fn fetch_tasks(&self) -> Result<Value, ClientError> {
        self.get("/tasks").await
    }

    pub async fn create_task(&self, task: &Value) -> Result<Value, ClientError> {
        self.post("/tasks", Some(task)).await
    }

    pub async fn fetch_notifications(&self) -> Result<Value, ClientError> {
        self.get("/notifications").await
    }

    pub async fn get_yield_prediction(&self, crop: &str) -> Result<Value, ClientError> {
        self.post("/predictions/yield", Some(&json!({"crop": crop})))
            .await
    }

    pub async fn fetch_predictions(&self) -> Result<Value, ClientError> {
        self.get("/predictions").await
    }

    pub async fn schedule_irrigation(&self, data: &Value) -> Result<Value, ClientError> {
        self.post("/irrigation", Some(data)).await
    }

    pub async fn set_weather_alert(&self, data: &Value) -> Result<Value, ClientError> {
        self.post("/alerts/weather", Some(data)).await
    }

    pub async fn analyze_field(&self) -> Result<Value, ClientError> {
        self.post("/analyze/field", None).await
    }

    pub async fn forecast(&self, days: u32) -> Result<Value, ClientError> {
        self.get(&format!("/forecast?days={}", days)).await
    }

    pub async fn set_location(&self, location: &str) -> Result<Value, ClientError> {
        self.post("/location", Some(&json!({"location": location})))
            .await
    }

    pub async fn analyze_disease(&self, image_base64: &str) -> Result<Value, ClientError> {
        self.post(
            "/disease/analyze",
            Some(&json!({"imageBase64": image_base64})),
        )
        .await
    }

    pub async fn get_disease_history(&self) -> Result<Value, ClientError> {
        self.get("/disease/history").await
    }
}

// ============================================================================
// Tests
// ============================================================================
