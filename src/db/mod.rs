pub mod config;
pub mod operations;
pub mod sqlite_schema;

use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::sqlite_schema::{
    split_sql_statements, strip_comment_lines, SCHEMA_VERSION, SQLITE_SCHEMA_SQL,
};

pub const LOCAL_USER_ID: &str = "local";

#[derive(Clone)]
pub struct Database {
    config: DbConfig,
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file, applies the schema and
    /// makes sure the local learner exists.
    pub async fn connect(config: DbConfig) -> Result<Self, DbInitError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DbInitError::Io(e.to_string()))?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", config.path.display());
        let options = SqliteConnectOptions::from_str(&db_url)
            .map_err(|e| DbInitError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(config.journal_mode.as_sqlx())
            .foreign_keys(config.foreign_keys)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        run_sqlite_migrations(&pool).await?;
        ensure_local_user(&pool).await?;

        tracing::info!(path = %config.path.display(), "sqlite database ready");

        Ok(Self { config, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &std::path::Path {
        &self.config.path
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), DbInitError> {
    let version: Option<String> =
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.is_some() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for stmt in split_sql_statements(SQLITE_SCHEMA_SQL) {
        let sql = strip_comment_lines(&stmt);
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::query(trimmed).execute(&mut *tx).await?;
    }

    sqlx::query(
        r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#,
    )
    .bind(SCHEMA_VERSION)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(version = SCHEMA_VERSION, "applied sqlite schema");
    Ok(())
}

async fn ensure_local_user(pool: &SqlitePool) -> Result<(), DbInitError> {
    let existing: Option<String> = sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "id" = ?"#)
        .bind(LOCAL_USER_ID)
        .fetch_optional(pool)
        .await?;

    if existing.is_none() {
        sqlx::query(r#"INSERT INTO "users" ("id", "username", "createdAt") VALUES (?, ?, ?)"#)
            .bind(LOCAL_USER_ID)
            .bind("local_user")
            .bind(operations::format_timestamp(Utc::now()))
            .execute(pool)
            .await?;
        tracing::info!(user_id = LOCAL_USER_ID, "seeded local learner");
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
