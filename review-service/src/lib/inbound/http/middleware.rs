use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::ACCESS_COOKIE_NAME;
use super::handlers::ApiError;
use super::router::AppState;
use crate::domain::authorization::Actor;

/// Middleware that resolves the access token to an [`Actor`] and adds it
/// to request extensions.
///
/// The `Authentication` cookie is tried first. When it is absent or
/// rejected, an `Authorization: Bearer` header is used instead, so a stale
/// cookie never blocks a valid header.
///
/// [`Actor`]: crate::domain::authorization::Actor
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_token = extract_token_from_header(&req).map(str::to_string);

    let actor = match jar.get(ACCESS_COOKIE_NAME) {
        Some(cookie) => match resolve(&state, cookie.value()).await {
            Ok(actor) => actor,
            Err(cookie_error) => match header_token {
                Ok(token) => resolve(&state, &token).await?,
                Err(_) => return Err(cookie_error),
            },
        },
        None => resolve(&state, &header_token?).await?,
    };

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

async fn resolve(state: &AppState, token: &str) -> Result<Actor, ApiError> {
    state
        .authentication_service
        .authenticate(token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            ApiError::from(e)
        })
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing access token".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}
