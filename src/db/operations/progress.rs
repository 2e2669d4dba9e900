use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_timestamp, parse_timestamp};
use crate::db::Database;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub word_id: i64,
    pub mastery_level: i64,
    pub review_count: i64,
    pub correct_count: i64,
    pub next_review_date: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn incorrect_count(&self) -> i64 {
        self.review_count - self.correct_count
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTotals {
    pub words_studied: i64,
    pub total_reviews: i64,
    pub total_correct: i64,
    pub mastery_breakdown: BTreeMap<i64, i64>,
    pub studied_by_level: BTreeMap<i64, i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedProgress {
    pub progress_records: u64,
    pub quiz_results: u64,
    pub pending_quizzes: u64,
}

pub async fn get_progress(
    conn: &mut SqliteConnection,
    user_id: &str,
    word_id: i64,
) -> Result<Option<ProgressRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT p."wordId", p."masteryLevel", p."reviewCount", p."correctCount",
               p."nextReviewDate", p."lastReviewedAt"
        FROM "word_progress" p
        WHERE p."userId" = ? AND p."wordId" = ?
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|r| map_progress_row(&r)))
}

pub async fn upsert_progress(
    conn: &mut SqliteConnection,
    user_id: &str,
    record: &ProgressRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "word_progress"
          ("userId", "wordId", "masteryLevel", "reviewCount", "correctCount", "nextReviewDate", "lastReviewedAt")
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT ("userId", "wordId") DO UPDATE SET
          "masteryLevel" = excluded."masteryLevel",
          "reviewCount" = excluded."reviewCount",
          "correctCount" = excluded."correctCount",
          "nextReviewDate" = excluded."nextReviewDate",
          "lastReviewedAt" = excluded."lastReviewedAt"
        "#,
    )
    .bind(user_id)
    .bind(record.word_id)
    .bind(record.mastery_level)
    .bind(record.review_count)
    .bind(record.correct_count)
    .bind(format_timestamp(record.next_review_date))
    .bind(format_timestamp(record.last_reviewed_at))
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn progress_totals(db: &Database, user_id: &str) -> Result<ProgressTotals, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
          COUNT(*) AS "studied",
          COALESCE(SUM("reviewCount"), 0) AS "reviews",
          COALESCE(SUM("correctCount"), 0) AS "correct"
        FROM "word_progress"
        WHERE "userId" = ? AND "reviewCount" > 0
        "#,
    )
    .bind(user_id)
    .fetch_one(db.pool())
    .await?;

    let mastery_rows = sqlx::query(
        r#"
        SELECT "masteryLevel", COUNT(*) AS "count"
        FROM "word_progress"
        WHERE "userId" = ?
        GROUP BY "masteryLevel"
        ORDER BY "masteryLevel"
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    let level_rows = sqlx::query(
        r#"
        SELECT v."hskLevel", COUNT(*) AS "count"
        FROM "word_progress" p
        INNER JOIN "vocabulary" v ON v."id" = p."wordId"
        WHERE p."userId" = ? AND p."reviewCount" > 0
        GROUP BY v."hskLevel"
        ORDER BY v."hskLevel"
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    Ok(ProgressTotals {
        words_studied: row.try_get("studied").unwrap_or(0),
        total_reviews: row.try_get("reviews").unwrap_or(0),
        total_correct: row.try_get("correct").unwrap_or(0),
        mastery_breakdown: mastery_rows
            .iter()
            .map(|r| {
                (
                    r.try_get::<i64, _>("masteryLevel").unwrap_or_default(),
                    r.try_get::<i64, _>("count").unwrap_or_default(),
                )
            })
            .collect(),
        studied_by_level: level_rows
            .iter()
            .map(|r| {
                (
                    r.try_get::<i64, _>("hskLevel").unwrap_or_default(),
                    r.try_get::<i64, _>("count").unwrap_or_default(),
                )
            })
            .collect(),
    })
}

/// Mastery and review date of every word the learner has a record for.
pub async fn mastery_by_word(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ProgressRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT p."wordId", p."masteryLevel", p."reviewCount", p."correctCount",
               p."nextReviewDate", p."lastReviewedAt"
        FROM "word_progress" p
        WHERE p."userId" = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;
    Ok(rows.iter().map(map_progress_row).collect())
}

/// Removes the learner's progress, quiz log and pending quizzes.
/// Vocabulary is never touched.
pub async fn clear_progress(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<ClearedProgress, sqlx::Error> {
    let progress_records = sqlx::query(r#"DELETE FROM "word_progress" WHERE "userId" = ?"#)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    let quiz_results = sqlx::query(r#"DELETE FROM "quiz_results" WHERE "userId" = ?"#)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    let pending_quizzes = sqlx::query(r#"DELETE FROM "pending_quizzes" WHERE "userId" = ?"#)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(ClearedProgress {
        progress_records,
        quiz_results,
        pending_quizzes,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> ProgressRecord {
    let next_review: String = row.try_get("nextReviewDate").unwrap_or_default();
    let last_reviewed: String = row.try_get("lastReviewedAt").unwrap_or_default();
    ProgressRecord {
        word_id: row.try_get("wordId").unwrap_or_default(),
        mastery_level: row.try_get("masteryLevel").unwrap_or_default(),
        review_count: row.try_get("reviewCount").unwrap_or_default(),
        correct_count: row.try_get("correctCount").unwrap_or_default(),
        next_review_date: parse_timestamp(&next_review).unwrap_or_else(Utc::now),
        last_reviewed_at: parse_timestamp(&last_reviewed).unwrap_or_else(Utc::now),
    }
}
