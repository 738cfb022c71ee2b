//! Record types, one per collection.
//!
//! Every record serializes with camelCase keys, which is the shape the
//! dashboard reads. The store id is exposed as `_id`, so a caller's own `id`
//! key passes through untouched. Free-form records keep caller-supplied keys
//! in a flattened `fields` map; only keys the server writes itself (`_id`,
//! `createdAt`, and `kind` on actions) are stripped with [`free_form`].

pub mod action;
pub mod chat;
pub mod disease;
pub mod field;
pub mod prediction;
pub mod setting;
pub mod task;

pub use action::{IrrigationAction, WeatherAlert};
pub use chat::{ChatMessage, NewChatMessage};
pub use disease::{DiseaseAnalysis, DiseaseResult, NewDiseaseAnalysis};
pub use field::FieldAnalysis;
pub use prediction::PredictionRequest;
pub use setting::LocationSetting;
pub use task::{Notification, Task};

use serde_json::{Map, Value};

/// Drop `reserved` keys from a caller-supplied body.
pub fn free_form(mut body: Map<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    for key in reserved {
        body.remove(*key);
    }
    body
}
