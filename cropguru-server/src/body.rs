//! Permissive JSON body extraction.
//!
//! Handlers read optional fields out of whatever object the client sent. A
//! missing body, a non-JSON content type, or a top-level array all yield an
//! empty object. Unparseable JSON, a bare scalar, and any string holding
//! U+0000 are rejected. Postgres cannot store NUL in `text` or `jsonb`, so the
//! last case is refused up front for every backend.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde_json::{Map, Value};

use crate::error::AppError;

pub struct JsonBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Ok(Self(Map::new()));
        }
        let bytes = Bytes::from_request(req, state).await?;
        parse_object(&bytes).map(Self)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

pub fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) if map.iter().any(|(k, v)| k.contains('\0') || has_nul(v)) => {
            Err(AppError::NulCharacter)
        }
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Array(_)) => Ok(Map::new()),
        Ok(_) | Err(_) => Err(AppError::MalformedPayload),
    }
}

fn has_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(has_nul),
        Value::Object(map) => map.iter().any(|(k, v)| k.contains('\0') || has_nul(v)),
        _ => false,
    }
}

/// String value of `key`, if present and a string.
pub fn str_field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_empty_body_is_empty_object() {
        assert!(parse_object(b"").unwrap().is_empty());
        assert!(parse_object(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_object_body_is_kept() {
        let map = parse_object(br#"{"crop":"maize","acres":4}"#).unwrap();
        assert_eq!(map["crop"], "maize");
        assert_eq!(map["acres"], 4);
    }

    #[test]
    fn test_array_body_is_empty_object() {
        assert!(parse_object(b"[1,2]").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_or_garbage_is_rejected() {
        assert!(matches!(parse_object(b"42"), Err(AppError::MalformedPayload)));
        assert!(matches!(parse_object(b"{not json"), Err(AppError::MalformedPayload)));
    }

    #[test]
    fn test_nul_anywhere_is_rejected() {
        assert!(matches!(
            parse_object(br#"{"title":"a\u0000b"}"#),
            Err(AppError::NulCharacter)
        ));
        assert!(matches!(
            parse_object(br#"{"tags":[{"k":"\u0000"}]}"#),
            Err(AppError::NulCharacter)
        ));
        assert!(matches!(
            parse_object(br#"{"\u0000":1}"#),
            Err(AppError::NulCharacter)
        ));
        assert!(parse_object(br#"{"title":"a\\u0000b"}"#).is_ok());
    }

    #[test]
    fn test_is_json_content_type() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));
    }

    #[test]
    fn test_str_field_ignores_non_strings() {
        let map = parse_object(br#"{"message":"hi","language":7}"#).unwrap();
        assert_eq!(str_field(&map, "message"), Some("hi"));
        assert_eq!(str_field(&map, "language"), None);
        assert_eq!(str_field(&map, "missing"), None);
    }
}
