use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    DeleteResponse, ListQuery, PortfolioRecord, PublishedResponse, SlugCheckResponse,
    SlugifyQuery, SlugifyResponse,
};
use super::extractors::OwnerId;
use super::services::SlugAvailability;
use crate::{error::api_error, slug, state::AppState};

pub fn portfolio_routes() -> Router<AppState> {
    Router::new()
        .route("/portfolios", get(list_recent).put(publish))
        .route("/portfolios/:slug", get(get_portfolio).delete(delete_portfolio))
        .route("/slugs/:slug", get(check_slug))
        .route("/slugify", get(slugify))
}

#[instrument(skip(state))]
pub async fn list_recent(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<PortfolioRecord>>, (StatusCode, String)> {
    let items = state
        .store
        .list_recent_portfolios(q.limit)
        .await
        .map_err(api_error)?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PortfolioRecord>, (StatusCode, String)> {
    state
        .store
        .get_portfolio_by_slug(&slug)
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "portfolio not found".into()))
}

/// Publishes the body as the caller named by the identity header. Any `userId`
/// in the body is ignored; without the header the portfolio is anonymous.
#[instrument(skip(state, owner, record), fields(slug = %record.slug))]
pub async fn publish(
    State(state): State<AppState>,
    owner: Option<OwnerId>,
    Json(mut record): Json<PortfolioRecord>,
) -> Result<(StatusCode, Json<PublishedResponse>), (StatusCode, String)> {
    record.user_id = owner.map(|OwnerId(owner)| owner);

    let portfolio = state
        .store
        .publish_portfolio(record)
        .await
        .map_err(api_error)?;

    info!(slug = %portfolio.slug, "portfolio published");
    Ok((
        StatusCode::OK,
        Json(PublishedResponse {
            path: slug::public_path(&portfolio.slug),
            portfolio,
        }),
    ))
}

#[instrument(skip(state, owner))]
pub async fn delete_portfolio(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(slug): Path<String>,
) -> Result<Json<DeleteResponse>, (StatusCode, String)> {
    let deleted = state
        .store
        .delete_portfolio(&slug, &owner)
        .await
        .map_err(api_error)?;
    Ok(Json(DeleteResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn check_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SlugCheckResponse>, (StatusCode, String)> {
    let key = slug::normalize(&slug);
    let availability = state.store.check_slug(&key).await.map_err(api_error)?;

    let (status, reason) = match availability {
        SlugAvailability::Available => ("available", None),
        SlugAvailability::Taken => ("taken", Some("this URL is taken".to_string())),
        SlugAvailability::Invalid(e) => ("invalid", Some(e.to_string())),
    };
    Ok(Json(SlugCheckResponse {
        slug: key,
        available: status == "available",
        status,
        reason,
    }))
}

pub async fn slugify(Query(q): Query<SlugifyQuery>) -> Json<SlugifyResponse> {
    let slug = slug::slugify(&q.text);
    Json(SlugifyResponse {
        path: slug::public_path(&slug),
        slug,
    })
}
