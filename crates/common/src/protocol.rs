//! Request and response types exchanged between components.
//!
//! Every payload that carries an event secret code does so in a field named
//! `secret_code`. On the wire that field always holds a token produced by the
//! secret-code codec, never the plaintext.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Body of an event-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreate {
    pub event_name: String,
    pub points: i64,
    pub secret_code: String,
}

/// Body of an event-update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

/// Body of a volunteer authorization request for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    pub event_id: String,
    pub secret_code: String,
}

/// An event as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_name: String,
    pub points: i64,
    pub secret_code: String,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub participants: u64,
}

// ---------------------------------------------------------------------------
// Transform endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt` and `POST /decrypt`.
///
/// The `payload` field contains a JSON object whose secret-code fields are
/// located via the payload kind named in the `X-Payload-Kind` request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Arbitrary JSON object to transform secret-code fields within.
    pub payload: serde_json::Value,
}

/// Successful response body for `POST /encrypt` and `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResponse {
    /// Input structure with secret-code fields transformed.
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the codec key has been derived.
    pub key_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_update_omits_absent_fields() {
        let update = EventUpdate {
            points: Some(50),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"points": 50}));
    }

    #[test]
    fn event_defaults_counters() {
        let event: Event = serde_json::from_value(json!({
            "event_id": "e1",
            "event_name": "Hackathon",
            "points": 10,
            "secret_code": "tok"
        }))
        .unwrap();
        assert!(!event.expired);
        assert_eq!(event.participants, 0);
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&crate::ServiceError::BadRequest("unknown kind".into()));
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("unknown kind"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            key_ready: true,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert!(decoded.key_ready);
    }
}
