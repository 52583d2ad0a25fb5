use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::authorization::Actor;
use crate::inbound::http::router::AppState;

pub async fn log_out(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageData>), ApiError> {
    state.authentication_service.log_out(&actor.id).await?;

    Ok((
        state.cookies.without_session(jar),
        ApiSuccess::new(StatusCode::OK, MessageData::success()),
    ))
}
