// web-server/src/api/boot_data.rs
use std::time::Duration;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{get, web, HttpRequest, HttpResponse};
use goai_common::Config;
use tracing::Instrument;
use uuid::Uuid;

use crate::cookies::session_token;
use crate::error::ProxyError;
use crate::headers::DEFAULT_CONTENT_TYPE;
use crate::upstream::UpstreamClient;

// Straight passthrough: status, bytes and content type only
#[get("/boot-data")]
pub async fn get_boot_data(
    req: HttpRequest,
    config: web::Data<Config>,
    upstream: web::Data<UpstreamClient>,
) -> Result<HttpResponse, ProxyError> {
    let token = session_token(&req, &config);

    let span = tracing::info_span!(
        "boot_data",
        request_id = %Uuid::new_v4(),
        authenticated = token.is_some()
    );
    forward_boot_data(&config, &upstream, token.as_deref())
        .instrument(span)
        .await
}

async fn forward_boot_data(
    config: &Config,
    upstream: &UpstreamClient,
    token: Option<&str>,
) -> Result<HttpResponse, ProxyError> {
    let timeout = config.upstream.boot_data_timeout_secs.map(Duration::from_secs);
    let response = upstream.boot_data(token, timeout).await?;
    let content_type = response
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    Ok(HttpResponse::build(response.status_code())
        .insert_header((CONTENT_TYPE, content_type))
        .body(response.bytes))
}
