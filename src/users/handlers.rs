use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{dto::IdentityProfile, repo_types::UserRecord};
use crate::{error::api_error, portfolio::PortfolioRecord, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(sync_user))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/portfolios", get(list_user_portfolios))
}

/// Called after every sign-in to keep the local user row in step with the
/// identity provider.
#[instrument(skip(state, profile), fields(clerk_id = %profile.clerk_id))]
pub async fn sync_user(
    State(state): State<AppState>,
    Json(profile): Json<IdentityProfile>,
) -> Result<Json<UserRecord>, (StatusCode, String)> {
    let user = state.store.upsert_user(&profile).await.map_err(api_error)?;
    info!(user_id = %user.id, "user synced");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserRecord>, (StatusCode, String)> {
    state
        .store
        .get_user_by_clerk_id(&user_id)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "user not found".into()))
}

#[instrument(skip(state))]
pub async fn list_user_portfolios(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PortfolioRecord>>, (StatusCode, String)> {
    let items = state
        .store
        .list_portfolios_by_user(&user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(items))
}
