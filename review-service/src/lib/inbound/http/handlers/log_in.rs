use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::authentication::models::SessionTokens;
use crate::inbound::http::router::AppState;

pub async fn log_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LogInRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionData>), ApiError> {
    let tokens = state
        .authentication_service
        .log_in(&body.email, &body.password)
        .await?;

    Ok((
        state.cookies.with_session(jar, &tokens),
        ApiSuccess::new(StatusCode::OK, SessionData::from(&tokens)),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogInRequest {
    email: String,
    password: String,
}

/// Body returned alongside the session cookies.
///
/// The access token is included for clients that send it as a Bearer
/// header; the refresh token only travels in its HttpOnly cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub user: UserData,
    pub access_token: String,
    pub expires_in: i64,
}

impl From<&SessionTokens> for SessionData {
    fn from(tokens: &SessionTokens) -> Self {
        Self {
            user: UserData::from(&tokens.user),
            access_token: tokens.access.token.clone(),
            expires_in: tokens.access.ttl.num_seconds(),
        }
    }
}
