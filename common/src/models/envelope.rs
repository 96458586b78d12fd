// common/src/models/envelope.rs
use serde_json::{json, Map, Value};

/// Body returned by the backend.
///
/// Only a JSON object counts as structured; anything else is kept verbatim so the
/// caller can still surface it.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Structured(Map<String, Value>),
    RawText(String),
}

impl UpstreamBody {
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => UpstreamBody::Structured(map),
            _ => UpstreamBody::RawText(text.to_string()),
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            UpstreamBody::Structured(map) => Some(map),
            UpstreamBody::RawText(_) => None,
        }
    }

    /// The bearer token of a login response, if any.
    ///
    /// A non-string token is stringified rather than ignored so it can never slip
    /// through to the client in a passthrough body.
    pub fn access_token(&self) -> Option<String> {
        match self.as_structured()?.get("access_token")? {
            Value::Null => None,
            Value::String(token) => Some(token.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn token_type(&self) -> Value {
        self.as_structured()
            .and_then(|map| map.get("token_type"))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Body for an error passthrough: structured bodies as-is, raw text wrapped.
    pub fn into_error_json(self) -> Value {
        match self {
            UpstreamBody::Structured(map) => Value::Object(map),
            UpstreamBody::RawText(raw) => json!({ "success": false, "raw": raw }),
        }
    }
}
