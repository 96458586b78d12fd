// web-server/src/middleware/rate_limiter.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{header, StatusCode},
    Error, ResponseError,
    HttpResponse
};
use dashmap::DashMap;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use goai_common::RateLimitConfig;
use serde_json::json;
use thiserror::Error;

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
// Checks between sweeps of idle clients
const SWEEP_EVERY: usize = 256;

#[derive(Debug, Error)]
#[error("Too many requests")]
pub struct RateLimitExceeded;

impl ResponseError for RateLimitExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .append_header((header::RETRY_AFTER, RATE_LIMIT_WINDOW.as_secs().to_string()))
            .json(json!({
                "success": false,
                "error": self.to_string()
            }))
    }
}

/// Sliding one-minute window per client IP on the configured path prefixes.
///
/// Clients are keyed by socket peer address; `X-Forwarded-For` / `Forwarded` only count
/// when the gateway is configured to sit behind a trusted proxy.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    paths: Vec<String>,
    max_requests: usize,
    trust_forwarded: bool,
    store: Arc<DashMap<String, Vec<Instant>>>,
    checks: Arc<AtomicUsize>,
}

impl RateLimiter {
    pub fn new(paths: Vec<String>, max_requests: usize) -> Self {
        Self {
            paths,
            max_requests,
            trust_forwarded: false,
            store: Arc::new(DashMap::new()),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let mut limiter = Self::new(config.paths.clone(), config.max_requests_per_minute);
        limiter.trust_forwarded = config.trust_forwarded_headers;
        limiter
    }

    /// Clients currently holding hits in the window
    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_forwarded {
            if let Some(ip) = req.connection_info().realip_remote_addr() {
                return ip.to_string();
            }
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Drop clients whose hits have all left the window
    fn sweep(&self, now: Instant) {
        self.store.retain(|_, hits| {
            hits.retain(|time| now.duration_since(*time) < RATE_LIMIT_WINDOW);
            !hits.is_empty()
        });
    }

    fn applies_to(&self, path: &str) -> bool {
        self.max_requests > 0 && self.paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    fn is_rate_limited(&self, ip: &str, now: Instant) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep(now);
        }

        let mut hits = self.store.entry(ip.to_string()).or_default();
        hits.retain(|time| now.duration_since(*time) < RATE_LIMIT_WINDOW);

        if hits.len() >= self.max_requests {
            true
        } else {
            hits.push(now);
            false
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.limiter.applies_to(req.path()) {
            let ip = self.limiter.client_key(&req);

            if self.limiter.is_rate_limited(&ip, Instant::now()) {
                tracing::warn!("Rate limit exceeded for IP: {} on {}", ip, req.path());
                return Box::pin(async {
                    Err(RateLimitExceeded.into())
                });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            fut.await
        })
    }
}
