mod export;
mod health;
mod progress;
mod quizzes;
mod users;
mod vocabulary;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/vocabulary", vocabulary::router())
        .nest("/api/quizzes", quizzes::router())
        .nest("/api/progress", progress::router())
        .nest("/api/export", export::router())
        .nest("/api/users", users::router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// Learner selected by the `X-User-Id` header, falling back to the
/// configured default learner.
pub(crate) fn learner_id(state: &AppState, headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.config().default_user_id.clone())
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}
