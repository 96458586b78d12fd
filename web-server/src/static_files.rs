// web-server/src/static_files.rs
use std::path::PathBuf;

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::web;
use goai_common::StaticFilesConfig;

use crate::error::envelope;

/// File served for a path no asset matched.
///
/// `/{locale}/...` prefers that locale's own index when the build produced one.
pub fn fallback_path(config: &StaticFilesConfig, request_path: &str) -> PathBuf {
    let root = PathBuf::from(&config.path);
    let first_segment = request_path.trim_start_matches('/').split('/').next().unwrap_or("");

    if config.locales.iter().any(|locale| locale == first_segment) {
        let localized = root.join(first_segment).join(&config.index);
        if localized.is_file() {
            return localized;
        }
    }
    root.join(&config.index)
}

// Unmatched page routes get the SPA index; unmatched API routes never do
async fn spa_fallback(req: ServiceRequest, config: StaticFilesConfig) -> Result<ServiceResponse, actix_web::Error> {
    let (req, _) = req.into_parts();

    if req.path() == "/api" || req.path().starts_with("/api/") {
        let response = envelope(StatusCode::NOT_FOUND, "Not found");
        return Ok(ServiceResponse::new(req, response));
    }

    let file = NamedFile::open_async(fallback_path(&config, req.path())).await?;
    let response = file.into_response(&req);
    Ok(ServiceResponse::new(req, response))
}

// Site assets with locale-aware SPA fallback; register after the API scope
pub fn configure(cfg: &mut web::ServiceConfig, config: StaticFilesConfig) {
    let fallback_config = config.clone();

    cfg.service(
        Files::new("/", &config.path)
            .index_file(config.index.clone())
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true)
            .default_handler(fn_service(move |req: ServiceRequest| {
                spa_fallback(req, fallback_config.clone())
            })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> (tempfile::TempDir, StaticFilesConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "root").unwrap();
        fs::create_dir(dir.path().join("de")).unwrap();
        fs::write(dir.path().join("de").join("index.html"), "deutsch").unwrap();

        let config = StaticFilesConfig {
            path: dir.path().to_string_lossy().into_owned(),
            index: "index.html".to_string(),
            locales: vec!["en".to_string(), "de".to_string()],
        };
        (dir, config)
    }

    #[test]
    fn test_locale_index_preferred() {
        let (dir, config) = site();
        assert_eq!(
            fallback_path(&config, "/de/pricing"),
            dir.path().join("de").join("index.html")
        );
    }

    #[test]
    fn test_missing_locale_build_uses_root_index() {
        let (dir, config) = site();
        assert_eq!(fallback_path(&config, "/en/pricing"), dir.path().join("index.html"));
        assert_eq!(fallback_path(&config, "/dashboard/sessions"), dir.path().join("index.html"));
        assert_eq!(fallback_path(&config, "/"), dir.path().join("index.html"));
    }
}
