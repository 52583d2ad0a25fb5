use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::log_in::SessionData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::cookies::REFRESH_COOKIE_NAME;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<SessionData>), ApiError> {
    let refresh_token = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let tokens = state
        .authentication_service
        .refresh(&refresh_token)
        .await?;

    Ok((
        state.cookies.with_session(jar, &tokens),
        ApiSuccess::new(StatusCode::OK, SessionData::from(&tokens)),
    ))
}
