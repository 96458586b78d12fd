// web-server/src/api/history.rs
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{get, web, HttpRequest, HttpResponse};
use goai_common::models::{HistoryQuery, UpstreamBody};
use goai_common::Config;
use tracing::Instrument;
use uuid::Uuid;

use super::passthrough_error;
use crate::cookies::session_token;
use crate::error::{envelope, ProxyError};
use crate::headers::HeaderAllowList;
use crate::upstream::UpstreamClient;

#[get("/history")]
pub async fn get_history(
    req: HttpRequest,
    config: web::Data<Config>,
    upstream: web::Data<UpstreamClient>,
) -> Result<HttpResponse, ProxyError> {
    // Resolved locally, upstream never sees the request
    let Some(token) = session_token(&req, &config) else {
        return Ok(envelope(StatusCode::UNAUTHORIZED, "Authentication required"));
    };

    // Parsed only once the caller is known to hold a session
    let query = match web::Query::<HistoryQuery>::from_query(req.query_string()) {
        Ok(query) => query.into_inner(),
        Err(e) => {
            tracing::warn!("Rejected history query: {}", e);
            return Ok(envelope(StatusCode::BAD_REQUEST, "Invalid query parameters"));
        }
    };
    let span = tracing::info_span!(
        "history",
        request_id = %Uuid::new_v4(),
        page = %query.page,
        limit = %query.limit
    );
    forward_history(&config, &upstream, &token, &query)
        .instrument(span)
        .await
}

async fn forward_history(
    config: &Config,
    upstream: &UpstreamClient,
    token: &str,
    query: &HistoryQuery,
) -> Result<HttpResponse, ProxyError> {
    let timeout = Duration::from_secs(config.upstream.history_timeout_secs);
    let response = upstream.history(token, query, timeout).await?;
    let allow = HeaderAllowList::with_cache_validators();

    if response.status == 401 {
        tracing::info!("Upstream rejected session token");
        return Ok(envelope(StatusCode::UNAUTHORIZED, "Token expired or invalid"));
    }

    if !response.is_success() {
        tracing::warn!("History read failed upstream with status {}", response.status);
        return Ok(passthrough_error(&response, &allow));
    }

    match response.body() {
        UpstreamBody::Structured(map) => {
            let mut builder = HttpResponse::build(response.status_code());
            allow.forward(&response.headers, &mut builder);
            Ok(builder.json(map))
        }
        UpstreamBody::RawText(_) => {
            tracing::error!("History response was not a JSON object");
            Ok(envelope(StatusCode::BAD_GATEWAY, "Invalid response format"))
        }
    }
}
