use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authorization::require_role;
use crate::domain::authorization::Actor;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Replace a user's role and permissions. Administrators only.
pub async fn update_access(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAccessRequest>,
) -> Result<ApiSuccess<AccessData>, ApiError> {
    require_role(&actor, Role::Admin)?;
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command =
        UpdateAccessCommand::parse(&body.role, &body.permissions).map_err(UserError::from)?;

    state
        .user_service
        .update_access(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateAccessRequest {
    role: String,
    permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessData {
    pub id: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl From<&User> for AccessData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            role: user.role.to_string(),
            permissions: user
                .permissions
                .iter()
                .map(|permission| permission.to_string())
                .collect(),
        }
    }
}
