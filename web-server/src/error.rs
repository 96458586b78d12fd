// web-server/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Every failure a proxy handler can hit after it decided to call upstream
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The deadline fired before upstream answered
    #[error("{0} service timeout")]
    Timeout(&'static str),

    #[error("{0}")]
    Upstream(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Invalid request body")]
    InvalidPayload,

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Upstream(err.to_string())
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InvalidPayload => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        let message = if message.trim().is_empty() { "Proxy error" } else { message.as_str() };
        envelope(self.status_code(), message)
    }
}

/// `{success:false, error}` with the given status
pub fn envelope(status: StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "error": error
    }))
}
