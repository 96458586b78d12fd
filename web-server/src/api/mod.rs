// web-server/src/api/mod.rs
pub mod auth;
pub mod boot_data;
pub mod history;

use actix_web::http::StatusCode;
use actix_web::{get, web, HttpResponse, Responder};
use goai_common::models::UpstreamBody;
use serde_json::json;

use crate::error::envelope;
use crate::headers::{force_json, HeaderAllowList};
use crate::upstream::UpstreamResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(api_index)
            .service(auth::login)
            .service(auth::logout)
            .service(history::get_history)
            .service(boot_data::get_boot_data)
            .default_service(web::route().to(not_found)),
    );
}

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "GoAI Dashboard Gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn not_found() -> HttpResponse {
    envelope(StatusCode::NOT_FOUND, "Not found")
}

/// Upstream refused: keep its status, keep its body, wrap raw text
fn passthrough_error(response: &UpstreamResponse, allow: &HeaderAllowList) -> HttpResponse {
    let mut builder = HttpResponse::build(response.status_code());
    allow.forward(&response.headers, &mut builder);

    let body = response.body();
    if matches!(body, UpstreamBody::RawText(_)) {
        force_json(&mut builder);
    }
    builder.json(body.into_error_json())
}
