use axum::{extract::State, Json};
use serde::Serialize;

use models::account::AccountProfile;
use service::account::domain::{LoginInput, RegisterInput};

use crate::errors::ApiError;
use crate::routes::ServerState;

#[derive(Serialize)]
pub struct LoginOutput {
    pub message: &'static str,
    pub user: AccountProfile,
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<AccountProfile>, ApiError> {
    let profile = state.accounts.register(input).await?;
    Ok(Json(profile))
}

/// No session or token is issued; a successful login only confirms the
/// credentials and echoes the public projection.
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginOutput>, ApiError> {
    let user = state.accounts.authenticate(input).await?;
    Ok(Json(LoginOutput { message: "Login successful", user }))
}
