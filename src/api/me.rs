use crate::api::AppState;
use crate::api::middleware::CustomerUser;
use crate::api::schemas::auth::UpdateProfile;
use crate::api::schemas::{self, Envelope};
use crate::error::Result;
use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};

pub async fn get_me(user: CustomerUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let profile = state.account_service.get_me(user.user_id).await?;
    Ok(Envelope::ok(profile))
}

pub async fn update_me(
    user: CustomerUser,
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateProfile>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = schemas::body(payload)?;
    let profile = state.account_service.update_me(user.user_id, payload.into()).await?;
    Ok(Envelope::ok(profile))
}
