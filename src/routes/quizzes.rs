use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::learner_id;
use crate::response::{ok, AppError};
use crate::services::bounded_count;
use crate::services::quiz::{self, QuizRequest, DEFAULT_HISTORY, MAX_HISTORY};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quiz))
        .route("/history", get(history))
        .route("/:id/submit", post(submit))
}

/// Request fields are snake_case like every query string and tool argument.
#[derive(Debug, Deserialize)]
struct CreateQuizRequest {
    hsk_level: i64,
    num_questions: Option<i64>,
    quiz_type: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

async fn create_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateQuizRequest>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let request = QuizRequest::from_args(
        body.hsk_level,
        body.num_questions,
        body.quiz_type.as_deref(),
        body.direction.as_deref(),
    )?;

    let quiz = quiz::generate_quiz(state.db(), &user_id, &request).await?;
    Ok((StatusCode::CREATED, ok(quiz)).into_response())
}

async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(quiz_id): Path<String>,
    Json(body): Json<SubmitRequest>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let outcome = quiz::submit_answers(state.db(), &user_id, &quiz_id, &body.answers).await?;
    Ok(ok(outcome).into_response())
}

async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let limit = bounded_count("limit", query.limit, DEFAULT_HISTORY, MAX_HISTORY)?;
    let results = quiz::history(state.db(), &user_id, limit).await?;
    Ok(ok(results).into_response())
}
