pub mod answers;
pub mod export;
pub mod progress;
pub mod quiz;
pub mod scheduling;
pub mod users;
pub mod vocabulary;

use crate::db::operations::{self, HskLevel};
use crate::db::Database;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub fn parse_hsk_level(value: i64) -> Result<HskLevel, ServiceError> {
    HskLevel::try_from(value).map_err(ServiceError::Validation)
}

/// Validates an optional count argument against `1..=max`.
pub fn bounded_count(
    name: &str,
    value: Option<i64>,
    default: i64,
    max: i64,
) -> Result<i64, ServiceError> {
    let value = value.unwrap_or(default);
    if !(1..=max).contains(&value) {
        return Err(ServiceError::validation(format!(
            "{name} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(value)
}

/// Fails with not-found unless the learner exists.
pub async fn ensure_learner(db: &Database, user_id: &str) -> Result<(), ServiceError> {
    match operations::get_learner(db, user_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found(format!("user '{user_id}' does not exist"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_count_applies_default_and_limits() {
        assert_eq!(bounded_count("count", None, 5, 20).unwrap(), 5);
        assert_eq!(bounded_count("count", Some(20), 5, 20).unwrap(), 20);
        assert!(matches!(
            bounded_count("count", Some(0), 5, 20),
            Err(ServiceError::Validation(_))
        ));
        assert!(bounded_count("count", Some(21), 5, 20).is_err());
    }

    #[test]
    fn invalid_level_is_a_validation_error() {
        assert!(matches!(parse_hsk_level(7), Err(ServiceError::Validation(_))));
        assert_eq!(parse_hsk_level(1).unwrap().get(), 1);
    }
}
