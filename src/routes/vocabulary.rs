use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::learner_id;
use crate::response::{ok, AppError};
use crate::services::vocabulary::{
    self, DEFAULT_BATCH, DEFAULT_LIST_LIMIT, MAX_BATCH, MAX_LIST_LIMIT,
};
use crate::services::{bounded_count, parse_hsk_level};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/search", get(search))
        .route("/new", get(learn_new))
        .route("/review", get(review))
        .route("/random", get(random))
        .route("/statistics", get(statistics))
        .route("/:id", get(get_entry))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    hsk_level: Option<i64>,
    word_type: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    hsk_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BatchQuery {
    hsk_level: Option<i64>,
    count: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let limit = bounded_count("limit", query.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
    let level = query.hsk_level.map(parse_hsk_level).transpose()?;

    let words = match (query.word_type.as_deref(), level) {
        (Some(word_type), level) => {
            vocabulary::list_by_word_type(state.db(), word_type, level, limit).await?
        }
        (None, Some(level)) => vocabulary::list_by_level(state.db(), level, limit).await?,
        (None, None) => {
            return Err(AppError::validation(
                "either hsk_level or word_type is required",
            ))
        }
    };
    Ok(ok(words).into_response())
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let level = query.hsk_level.map(parse_hsk_level).transpose()?;
    let words = vocabulary::search(state.db(), &query.q, level).await?;
    Ok(ok(words).into_response())
}

async fn learn_new(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BatchQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let count = bounded_count("count", query.count, DEFAULT_BATCH, MAX_BATCH)?;
    let level = query
        .hsk_level
        .ok_or_else(|| AppError::validation("hsk_level is required"))
        .and_then(|level| parse_hsk_level(level).map_err(AppError::from))?;

    let words = vocabulary::learn_new(state.db(), &user_id, level, count).await?;
    Ok(ok(words).into_response())
}

async fn review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BatchQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let count = bounded_count("count", query.count, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
    let level = query.hsk_level.map(parse_hsk_level).transpose()?;

    let words = vocabulary::review_due(state.db(), &user_id, level, count).await?;
    Ok(ok(words).into_response())
}

async fn random(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<Response, AppError> {
    let count = bounded_count("count", query.count, DEFAULT_BATCH, MAX_BATCH)?;
    let level = query.hsk_level.map(parse_hsk_level).transpose()?;

    let words = vocabulary::random(state.db(), level, count).await?;
    Ok(ok(words).into_response())
}

async fn statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let stats = vocabulary::statistics(state.db(), &user_id).await?;
    Ok(ok(stats).into_response())
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let entry = vocabulary::get_entry(state.db(), id).await?;
    Ok(ok(entry).into_response())
}
