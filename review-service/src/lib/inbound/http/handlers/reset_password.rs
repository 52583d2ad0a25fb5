use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<ResetPasswordQuery>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = Password::confirmed(body.new_password, &body.repeat_new_password)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid password: {}", e)))?;

    state
        .authentication_service
        .reset_password(&query.token, new_password)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, MessageData::success()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordQuery {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    new_password: String,
    repeat_new_password: String,
}
