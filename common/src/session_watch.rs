//! Client-side auto-logout.
//!
//! A dashboard client that holds a gateway session can run an [`AutoLogout`] beside it:
//! the watcher ticks on a fixed interval, compares the session's implied expiry against
//! the local clock (minus a skew tolerance) and fires the regular logout flow once the
//! session is judged dead. Server-side cookie expiry and backend token validation remain
//! the real enforcement.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AutoLogoutConfig;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Logout request failed: {0}")]
    Network(String),

    #[error("Logout endpoint answered with status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WatchError::Network("Request timed out".to_string())
        } else {
            WatchError::Network(err.to_string())
        }
    }
}

/// A session as seen by the client at the moment the cookie was issued
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub max_age: Option<Duration>,
}

#[derive(Deserialize)]
struct ExpClaim {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying it.
///
/// Opaque tokens simply have no claim-derived expiry.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = base64::decode_config(payload.trim_end_matches('='), base64::URL_SAFE_NO_PAD).ok()?;
    let claims: ExpClaim = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

impl TrackedSession {
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>, max_age: Option<Duration>) -> Self {
        Self {
            token: token.into(),
            issued_at,
            max_age,
        }
    }

    /// Build a session from a `Set-Cookie` header value.
    ///
    /// Returns `None` for other cookies and for clearing cookies (empty value or
    /// non-positive `Max-Age`).
    pub fn from_set_cookie(cookie_name: &str, header: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let value = value.trim();
        if name.trim() != cookie_name || value.is_empty() {
            return None;
        }

        let mut max_age = None;
        for attribute in parts {
            if let Some((key, raw)) = attribute.split_once('=') {
                if key.trim().eq_ignore_ascii_case("max-age") {
                    max_age = raw.trim().parse::<i64>().ok();
                }
            }
        }

        match max_age {
            Some(secs) if secs <= 0 => None,
            // Out of chrono's range: no usable cookie expiry
            Some(secs) => Some(Self::new(value, now, Duration::try_seconds(secs))),
            None => Some(Self::new(value, now, None)),
        }
    }

    /// Earliest of cookie expiry and token `exp`; `None` when neither is known
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let cookie_expiry = self
            .max_age
            .and_then(|age| self.issued_at.checked_add_signed(age));
        match (cookie_expiry, jwt_expiry(&self.token)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// What to do once a session is judged expired
#[async_trait]
pub trait LogoutAction: Send + Sync {
    async fn logout(&self) -> Result<(), WatchError>;
}

/// Logs out through the gateway's own logout route, same as a manual logout
pub struct HttpLogout {
    http: reqwest::Client,
    url: String,
}

impl HttpLogout {
    pub fn new(http: reqwest::Client, gateway_base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}/api/auth/logout", gateway_base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl LogoutAction for HttpLogout {
    async fn logout(&self) -> Result<(), WatchError> {
        let response = self.http.post(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Status(status.as_u16()));
        }
        Ok(())
    }
}

pub struct AutoLogout<A: LogoutAction> {
    config: AutoLogoutConfig,
    action: A,
}

impl<A: LogoutAction> AutoLogout<A> {
    pub fn new(config: AutoLogoutConfig, action: A) -> Self {
        Self { config, action }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Start tracking from a login response's `Set-Cookie` header
    pub fn track(&self, set_cookie: &str) -> Option<TrackedSession> {
        TrackedSession::from_set_cookie(&self.config.cookie_name, set_cookie, Utc::now())
    }

    pub fn is_expired(&self, session: &TrackedSession, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = session.expires_at() else {
            return false;
        };

        // A tolerance past the end of representable time covers any expiry
        let shifted = i64::try_from(self.config.clock_skew_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .and_then(|skew| now.checked_add_signed(skew));
        match shifted {
            Some(shifted) => shifted >= expires_at,
            None => true,
        }
    }

    /// One check; returns `true` when the logout action ran
    pub async fn check(&self, session: &TrackedSession, now: DateTime<Utc>) -> Result<bool, WatchError> {
        let expired = self.is_expired(session, now);

        if self.config.debug {
            tracing::info!(
                cookie = %self.config.cookie_name,
                expires_at = ?session.expires_at(),
                skew_ms = self.config.clock_skew_ms,
                expired,
                "Auto-logout check"
            );
        }

        if !expired {
            return Ok(false);
        }

        tracing::info!("Session for cookie {} expired, logging out", self.config.cookie_name);
        self.action.logout().await?;
        Ok(true)
    }

    /// Tick until the session expires, then log out once and return
    pub async fn watch(&self, session: &TrackedSession) -> Result<(), WatchError> {
        let period = StdDuration::from_millis(self.config.check_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);

        loop {
            ticker.tick().await;
            if self.check(session, Utc::now()).await? {
                return Ok(());
            }
        }
    }
}
