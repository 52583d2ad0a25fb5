use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::authentication::models::ChangePasswordCommand;
use crate::domain::authorization::Actor;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;
use crate::user::errors::PasswordPolicyError;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let command = body
        .try_into_command()
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid password: {}", e)))?;

    state
        .authentication_service
        .change_password(&actor.id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
    repeat_new_password: String,
}

impl ChangePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, PasswordPolicyError> {
        Ok(ChangePasswordCommand {
            old_password: self.old_password,
            new_password: Password::confirmed(self.new_password, &self.repeat_new_password)?,
        })
    }
}
