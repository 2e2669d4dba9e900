use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::learner_id;
use crate::response::{ok, AppError};
use crate::services::vocabulary::{self, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::services::{bounded_count, parse_hsk_level, progress};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::delete(clear))
        .route("/stats", get(stats))
        .route("/mastery/:level", get(by_mastery))
}

#[derive(Debug, Deserialize)]
struct MasteryQuery {
    hsk_level: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ClearQuery {
    #[serde(default)]
    confirm: bool,
}

async fn stats(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let stats = progress::stats(state.db(), &user_id).await?;
    Ok(ok(stats).into_response())
}

async fn by_mastery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(level): Path<i64>,
    Query(query): Query<MasteryQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let limit = bounded_count("limit", query.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
    let hsk_level = query.hsk_level.map(parse_hsk_level).transpose()?;

    let words = vocabulary::list_by_mastery(state.db(), &user_id, level, hsk_level, limit).await?;
    Ok(ok(words).into_response())
}

async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ClearQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let cleared = progress::clear(state.db(), &user_id, query.confirm).await?;
    Ok(ok(cleared).into_response())
}
