// web-server/src/upstream.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use goai_common::models::{HistoryQuery, UpstreamBody};
use goai_common::UpstreamConfig;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, RequestBuilder};
use url::Url;

use crate::error::ProxyError;

const LOGIN_PATH: &str = "api/login";
const BOOT_DATA_PATH: &str = "api/goai";
const HISTORY_PATH: &str = "api/goai/history";

/// Everything the handlers need from one upstream exchange
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl UpstreamResponse {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> UpstreamBody {
        UpstreamBody::parse(&String::from_utf8_lossy(&self.bytes))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Counts a deadline as armed for as long as it lives
struct DeadlineGuard(Arc<AtomicUsize>);

impl DeadlineGuard {
    fn arm(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// HTTP client for the external backend: one attempt per call, no retries
pub struct UpstreamClient {
    http: HttpClient,
    base_url: Url,
    armed_deadlines: Arc<AtomicUsize>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        // A trailing slash keeps any base path when joining endpoints
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            armed_deadlines: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Deadlines currently pending; zero whenever no request is in flight
    pub fn armed_deadlines(&self) -> usize {
        self.armed_deadlines.load(Ordering::SeqCst)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProxyError> {
        Ok(self.base_url.join(path)?)
    }

    /// Forward login credentials untouched
    pub async fn login(
        &self,
        body: Bytes,
        content_type: &str,
        timeout: Duration,
    ) -> Result<UpstreamResponse, ProxyError> {
        let request = self
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .header(CONTENT_TYPE, content_type)
            .body(body);

        self.execute(request, Some(timeout), "Auth").await
    }

    pub async fn history(
        &self,
        token: &str,
        query: &HistoryQuery,
        timeout: Duration,
    ) -> Result<UpstreamResponse, ProxyError> {
        let mut url = self.endpoint(HISTORY_PATH)?;
        url.query_pairs_mut().extend_pairs(query.pairs());

        let request = self.http.get(url).bearer_auth(token);
        self.execute(request, Some(timeout), "History").await
    }

    /// Without a token the `Authorization` header is still sent, empty
    pub async fn boot_data(
        &self,
        token: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<UpstreamResponse, ProxyError> {
        let authorization = token.map(|t| format!("Bearer {}", t)).unwrap_or_default();
        let request = self
            .http
            .get(self.endpoint(BOOT_DATA_PATH)?)
            .header(AUTHORIZATION, authorization);

        self.execute(request, timeout, "Boot data").await
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
        service: &'static str,
    ) -> Result<UpstreamResponse, ProxyError> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>(UpstreamResponse { status, headers, bytes })
        };

        let outcome = match timeout {
            Some(limit) => {
                let _deadline = DeadlineGuard::arm(&self.armed_deadlines);
                match tokio::time::timeout(limit, exchange).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!("{} upstream call exceeded {:?}", service, limit);
                        return Err(ProxyError::Timeout(service));
                    }
                }
            }
            None => exchange.await,
        };

        match outcome {
            Ok(response) => {
                tracing::debug!("{} upstream answered {}", service, response.status);
                Ok(response)
            }
            Err(e) if e.is_timeout() => Err(ProxyError::Timeout(service)),
            Err(e) => {
                tracing::error!("{} upstream call failed: {}", service, e);
                Err(e.into())
            }
        }
    }
}
