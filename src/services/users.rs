use chrono::Utc;
use uuid::Uuid;

use super::ServiceError;
use crate::db::operations::{self, Learner};
use crate::db::Database;

const MAX_USERNAME_LEN: usize = 64;

/// Makes sure the configured default learner exists, creating it with its id
/// as username. Returns `true` when a learner was created.
pub async fn ensure_default_learner(db: &Database, user_id: &str) -> Result<bool, ServiceError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ServiceError::validation("default user id must not be empty"));
    }
    if operations::get_learner(db, user_id).await?.is_some() {
        return Ok(false);
    }

    let learner = Learner {
        id: user_id.to_string(),
        username: user_id.chars().take(MAX_USERNAME_LEN).collect(),
        created_at: Utc::now(),
    };
    let created = operations::insert_learner(db, &learner).await?;
    if created {
        tracing::info!(user_id = %learner.id, "default learner created");
    }
    Ok(created)
}

pub async fn create_learner(
    db: &Database,
    id: Option<&str>,
    username: &str,
) -> Result<Learner, ServiceError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ServiceError::validation(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }

    let id = match id.map(str::trim) {
        Some("") => return Err(ServiceError::validation("user id must not be empty")),
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    };

    let learner = Learner {
        id,
        username: username.to_string(),
        created_at: Utc::now(),
    };

    if !operations::insert_learner(db, &learner).await? {
        return Err(ServiceError::validation(format!(
            "user '{}' already exists",
            learner.id
        )));
    }

    tracing::info!(user_id = %learner.id, "learner created");
    Ok(learner)
}
