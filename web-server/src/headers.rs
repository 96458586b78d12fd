// web-server/src/headers.rs
use actix_web::http::header::CONTENT_TYPE;
use actix_web::HttpResponseBuilder;
use reqwest::header::HeaderMap;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const BASE_HEADERS: &[&str] = &["content-type", "cache-control", "pragma", "expires"];
const CACHE_VALIDATORS: &[&str] = &["etag", "last-modified"];

/// Upstream headers allowed through to the browser; everything else is dropped
#[derive(Debug, Clone)]
pub struct HeaderAllowList {
    names: Vec<&'static str>,
}

impl HeaderAllowList {
    pub fn base() -> Self {
        Self { names: BASE_HEADERS.to_vec() }
    }

    /// Base list plus `etag` / `last-modified`
    pub fn with_cache_validators() -> Self {
        let mut names = BASE_HEADERS.to_vec();
        names.extend_from_slice(CACHE_VALIDATORS);
        Self { names }
    }

    /// Allowed headers in list order, with `content-type` always present
    pub fn filter(&self, upstream: &HeaderMap) -> Vec<(&'static str, String)> {
        let mut kept = Vec::new();
        for name in &self.names {
            if let Some(value) = upstream.get(*name).and_then(|v| v.to_str().ok()) {
                kept.push((*name, value.to_string()));
            }
        }

        if !kept.iter().any(|(name, _)| *name == "content-type") {
            kept.insert(0, ("content-type", DEFAULT_CONTENT_TYPE.to_string()));
        }
        kept
    }

    pub fn forward(&self, upstream: &HeaderMap, builder: &mut HttpResponseBuilder) {
        for (name, value) in self.filter(upstream) {
            builder.insert_header((name, value));
        }
    }
}

/// Force the default JSON content type, for bodies re-encoded by the proxy
pub fn force_json(builder: &mut HttpResponseBuilder) {
    builder.insert_header((CONTENT_TYPE, DEFAULT_CONTENT_TYPE));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn upstream_headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_drops_unlisted_headers() {
        let headers = upstream_headers(&[
            ("content-type", "application/json"),
            ("set-cookie", "backend=1"),
            ("x-powered-by", "uvicorn"),
            ("cache-control", "no-store"),
        ]);

        let kept = HeaderAllowList::base().filter(&headers);
        assert_eq!(
            kept,
            vec![
                ("content-type", "application/json".to_string()),
                ("cache-control", "no-store".to_string()),
            ]
        );
    }

    #[test]
    fn test_content_type_defaults() {
        let kept = HeaderAllowList::base().filter(&HeaderMap::new());
        assert_eq!(kept, vec![("content-type", DEFAULT_CONTENT_TYPE.to_string())]);
    }

    #[test]
    fn test_validators_only_when_asked() {
        let headers = upstream_headers(&[("etag", "\"abc\""), ("last-modified", "Tue, 01 Oct 2024 10:00:00 GMT")]);

        let base = HeaderAllowList::base().filter(&headers);
        assert!(base.iter().all(|(name, _)| *name == "content-type"));

        let full = HeaderAllowList::with_cache_validators().filter(&headers);
        assert!(full.contains(&("etag", "\"abc\"".to_string())));
        assert!(full.iter().any(|(name, _)| *name == "last-modified"));
    }
}
