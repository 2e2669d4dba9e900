use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{format_timestamp, parse_timestamp};
use crate::db::Database;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

pub async fn get_learner(db: &Database, user_id: &str) -> Result<Option<Learner>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT "id", "username", "createdAt" FROM "users" WHERE "id" = ? LIMIT 1"#)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;
    Ok(row.map(|r| map_learner_row(&r)))
}

/// Returns `false` when a learner with this id already exists.
pub async fn insert_learner(db: &Database, learner: &Learner) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT OR IGNORE INTO "users" ("id", "username", "createdAt") VALUES (?, ?, ?)"#,
    )
    .bind(&learner.id)
    .bind(&learner.username)
    .bind(format_timestamp(learner.created_at))
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected() > 0)
}

fn map_learner_row(row: &SqliteRow) -> Learner {
    let created_at: String = row.try_get("createdAt").unwrap_or_default();
    Learner {
        id: row.try_get("id").unwrap_or_default(),
        username: row.try_get("username").unwrap_or_default(),
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
    }
}
