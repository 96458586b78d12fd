// web-server/src/cookies.rs
use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use goai_common::Config;

/// Names a credential may have been stored under by any version of the site
pub const CLEARED_COOKIE_NAMES: [&str; 5] = ["auth_token", "token", "access_token", "refresh_token", "session"];

/// `(http_only, secure)` pairs every candidate is cleared under
const CLEARING_VARIANTS: [(bool, bool); 2] = [(true, true), (false, false)];

/// Session cookie issued on a successful login
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build(config.session.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.session.max_age_secs))
        .finish()
}

/// The stored token, if the request carries a non-empty session cookie
pub fn session_token(req: &HttpRequest, config: &Config) -> Option<String> {
    req.cookie(&config.session.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Expired, empty cookies for every candidate name under every attribute combination
pub fn clearance_cookies(session_cookie_name: &str) -> Vec<Cookie<'static>> {
    let mut names: Vec<String> = CLEARED_COOKIE_NAMES.iter().map(|n| n.to_string()).collect();
    if !names.iter().any(|n| n == session_cookie_name) {
        names.push(session_cookie_name.to_string());
    }

    let mut cookies = Vec::with_capacity(names.len() * CLEARING_VARIANTS.len());
    for name in names {
        for (http_only, secure) in CLEARING_VARIANTS {
            cookies.push(
                Cookie::build(name.clone(), "")
                    .path("/")
                    .http_only(http_only)
                    .secure(secure)
                    .expires(OffsetDateTime::UNIX_EPOCH)
                    .max_age(CookieDuration::seconds(0))
                    .finish(),
            );
        }
    }
    cookies
}
