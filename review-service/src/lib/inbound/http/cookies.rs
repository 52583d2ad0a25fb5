use auth::IssuedToken;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

use crate::authentication::models::SessionTokens;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE_NAME: &str = "Authentication";

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "Refresh";

/// Attributes of the session cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    /// Add both session cookies, each living as long as its token.
    pub fn with_session(&self, jar: CookieJar, tokens: &SessionTokens) -> CookieJar {
        jar.add(self.token_cookie(ACCESS_COOKIE_NAME, &tokens.access))
            .add(self.token_cookie(REFRESH_COOKIE_NAME, &tokens.refresh))
    }

    /// Expire both session cookies.
    pub fn without_session(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE_NAME).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE_NAME).path("/"))
    }

    fn token_cookie(&self, name: &'static str, issued: &IssuedToken) -> Cookie<'static> {
        Cookie::build((name, issued.token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(issued.ttl.num_seconds()))
            .build()
    }
}
