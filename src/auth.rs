//! Viewer auth capability check.
//!
//! Authentication itself belongs to an external provider. The server only asks
//! whether the provider's session cookie is present and renders the matching
//! triggers.

use axum_extra::extract::cookie::CookieJar;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    SignedIn,
    SignedOut,
}

impl Viewer {
    /// Inspect the request cookies for the provider's session cookie.
    #[must_use]
    pub fn from_cookies(cookies: &CookieJar, config: &AuthConfig) -> Self {
        match cookies.get(&config.session_cookie) {
            Some(cookie) if !cookie.value().is_empty() => Self::SignedIn,
            _ => Self::SignedOut,
        }
    }

    #[must_use]
    pub fn is_signed_in(self) -> bool {
        self == Self::SignedIn
    }
}
