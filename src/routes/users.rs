use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::services::users;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_user))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    id: Option<String>,
    username: String,
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Response, AppError> {
    let learner = users::create_learner(state.db(), body.id.as_deref(), &body.username).await?;
    Ok((StatusCode::CREATED, ok(learner)).into_response())
}
