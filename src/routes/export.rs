use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::learner_id;
use crate::response::AppError;
use crate::services::export::{self, ExportRequest};
use crate::services::parse_hsk_level;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/csv", get(csv))
}

#[derive(Debug, Deserialize)]
struct CsvQuery {
    hsk_level: Option<i64>,
    #[serde(default)]
    learned_only: bool,
    filename: Option<String>,
}

/// Streams the export back as an attachment instead of writing it to the
/// export directory.
async fn csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CsvQuery>,
) -> Result<Response, AppError> {
    let user_id = learner_id(&state, &headers);
    let request = ExportRequest {
        hsk_level: query.hsk_level.map(parse_hsk_level).transpose()?,
        learned_only: query.learned_only,
    };

    let filename = match query.filename.as_deref() {
        Some(raw) => export::sanitize_filename(raw)
            .ok_or_else(|| AppError::validation(format!("invalid export filename '{raw}'")))?,
        None => "hsk_vocabulary.csv".to_string(),
    };

    let (body, rows) = export::export_csv(state.db(), &user_id, &request).await?;
    tracing::info!(user_id = %user_id, rows, "csv export served");

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|err| AppError::internal(err.to_string()))?;
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
