use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_timestamp, parse_timestamp};
use crate::db::Database;

/// A generated quiz waiting for answers. Items are stored as JSON.
#[derive(Debug, Clone)]
pub struct PendingQuizRow {
    pub id: String,
    pub user_id: String,
    pub quiz_type: String,
    pub hsk_level: i64,
    pub items: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub quiz_type: String,
    pub hsk_level: Option<i64>,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score_percentage: f64,
    pub duration_seconds: i64,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultRecord {
    pub id: i64,
    pub quiz_type: String,
    pub hsk_level: Option<i64>,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score_percentage: f64,
    pub duration_seconds: i64,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_pending_quiz(
    db: &Database,
    quiz: &PendingQuizRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "pending_quizzes" ("id", "userId", "quizType", "hskLevel", "items", "createdAt")
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&quiz.id)
    .bind(&quiz.user_id)
    .bind(&quiz.quiz_type)
    .bind(quiz.hsk_level)
    .bind(quiz.items.to_string())
    .bind(format_timestamp(quiz.created_at))
    .execute(db.pool())
    .await?;
    Ok(())
}

pub async fn get_pending_quiz(
    conn: &mut SqliteConnection,
    quiz_id: &str,
) -> Result<Option<PendingQuizRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "id", "userId", "quizType", "hskLevel", "items", "createdAt"
        FROM "pending_quizzes"
        WHERE "id" = ?
        LIMIT 1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|r| map_pending_row(&r)))
}

pub async fn delete_pending_quiz(
    conn: &mut SqliteConnection,
    quiz_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "pending_quizzes" WHERE "id" = ?"#)
        .bind(quiz_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes pending quizzes created before `cutoff`. Returns the number removed.
pub async fn delete_stale_pending_quizzes(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "pending_quizzes" WHERE "createdAt" < ?"#)
        .bind(format_timestamp(cutoff))
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_quiz_result(
    conn: &mut SqliteConnection,
    user_id: &str,
    result: &NewQuizResult,
) -> Result<i64, sqlx::Error> {
    let done = sqlx::query(
        r#"
        INSERT INTO "quiz_results"
          ("userId", "quizType", "hskLevel", "totalQuestions", "correctAnswers",
           "scorePercentage", "durationSeconds", "details", "createdAt")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&result.quiz_type)
    .bind(result.hsk_level)
    .bind(result.total_questions)
    .bind(result.correct_answers)
    .bind(result.score_percentage)
    .bind(result.duration_seconds)
    .bind(result.details.to_string())
    .bind(format_timestamp(result.created_at))
    .execute(conn)
    .await?;
    Ok(done.last_insert_rowid())
}

/// Most recent results first.
pub async fn list_quiz_results(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<QuizResultRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "quizType", "hskLevel", "totalQuestions", "correctAnswers",
               "scorePercentage", "durationSeconds", "details", "createdAt"
        FROM "quiz_results"
        WHERE "userId" = ?
        ORDER BY "id" DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db.pool())
    .await?;
    Ok(rows.iter().map(map_result_row).collect())
}

fn map_pending_row(row: &SqliteRow) -> PendingQuizRow {
    let items: String = row.try_get("items").unwrap_or_default();
    let created_at: String = row.try_get("createdAt").unwrap_or_default();
    PendingQuizRow {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        quiz_type: row.try_get("quizType").unwrap_or_default(),
        hsk_level: row.try_get("hskLevel").unwrap_or_default(),
        items: serde_json::from_str(&items).unwrap_or(serde_json::Value::Null),
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
    }
}

fn map_result_row(row: &SqliteRow) -> QuizResultRecord {
    let details: String = row.try_get("details").unwrap_or_default();
    let created_at: String = row.try_get("createdAt").unwrap_or_default();
    QuizResultRecord {
        id: row.try_get("id").unwrap_or_default(),
        quiz_type: row.try_get("quizType").unwrap_or_default(),
        hsk_level: row.try_get("hskLevel").ok().flatten(),
        total_questions: row.try_get("totalQuestions").unwrap_or_default(),
        correct_answers: row.try_get("correctAnswers").unwrap_or_default(),
        score_percentage: row.try_get("scorePercentage").unwrap_or_default(),
        duration_seconds: row.try_get("durationSeconds").unwrap_or_default(),
        details: serde_json::from_str(&details).unwrap_or(serde_json::Value::Null),
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
    }
}
