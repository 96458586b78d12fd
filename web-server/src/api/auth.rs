// web-server/src/api/auth.rs
use std::time::Duration;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{post, route, web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use goai_common::models::UpstreamBody;
use goai_common::Config;
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use super::passthrough_error;
use crate::cookies::{clearance_cookies, session_cookie};
use crate::error::ProxyError;
use crate::headers::HeaderAllowList;
use crate::upstream::UpstreamClient;

/// Credentials are small; anything bigger is refused before upstream sees it
const MAX_CREDENTIALS_BYTES: usize = 16 * 1024;

async fn read_credentials(mut payload: web::Payload) -> Result<web::Bytes, ProxyError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!("Failed to read login body: {}", e);
            ProxyError::InvalidPayload
        })?;
        if body.len() + chunk.len() > MAX_CREDENTIALS_BYTES {
            return Err(ProxyError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

// Login: swap the backend bearer token for an HTTP-only cookie
#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    upstream: web::Data<UpstreamClient>,
) -> Result<HttpResponse, ProxyError> {
    let body = read_credentials(payload).await?;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let span = tracing::info_span!("login", request_id = %Uuid::new_v4());
    forward_login(&config, &upstream, body, &content_type)
        .instrument(span)
        .await
}

async fn forward_login(
    config: &Config,
    upstream: &UpstreamClient,
    credentials: web::Bytes,
    content_type: &str,
) -> Result<HttpResponse, ProxyError> {
    let timeout = Duration::from_secs(config.upstream.login_timeout_secs);
    let response = upstream.login(credentials, content_type, timeout).await?;
    let allow = HeaderAllowList::base();

    if !response.is_success() {
        tracing::warn!("Login rejected upstream with status {}", response.status);
        return Ok(passthrough_error(&response, &allow));
    }

    let body = response.body();
    let Some(token) = body.access_token() else {
        // Nothing to convert, hand the body over untouched
        let mut builder = HttpResponse::build(response.status_code());
        allow.forward(&response.headers, &mut builder);
        return Ok(match body {
            UpstreamBody::Structured(map) => builder.json(map),
            UpstreamBody::RawText(text) => builder.body(text),
        });
    };

    tracing::info!("Login succeeded, issuing session cookie");
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(config, token))
        .json(json!({
            "success": true,
            "token_type": body.token_type()
        })))
}

// Logout never fails and never calls upstream; GET is kept for plain links
#[route("/auth/logout", method = "POST", method = "GET")]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for cookie in clearance_cookies(&config.session.cookie_name) {
        builder.cookie(cookie);
    }

    tracing::info!("Session cookies cleared");
    builder.json(json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}
