use std::collections::BTreeMap;

use serde::Serialize;

use super::scheduling::{mastery_label, MAX_MASTERY, MIN_MASTERY};
use super::{ensure_learner, ServiceError};
use crate::db::operations::{self, ClearedProgress, QuizResultRecord};
use crate::db::Database;

const RECENT_QUIZZES: i64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryBucket {
    pub level: i64,
    pub label: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub user_id: String,
    pub words_studied: i64,
    pub total_reviews: i64,
    pub total_correct: i64,
    pub accuracy_percentage: f64,
    pub mastery_breakdown: Vec<MasteryBucket>,
    pub studied_by_level: BTreeMap<i64, i64>,
    pub recent_quizzes: Vec<QuizResultRecord>,
}

pub async fn stats(db: &Database, user_id: &str) -> Result<ProgressStats, ServiceError> {
    ensure_learner(db, user_id).await?;
    let totals = operations::progress_totals(db, user_id).await?;
    let recent_quizzes = operations::list_quiz_results(db, user_id, RECENT_QUIZZES).await?;

    let mastery_breakdown = (MIN_MASTERY..=MAX_MASTERY)
        .map(|level| MasteryBucket {
            level,
            label: mastery_label(level),
            count: totals.mastery_breakdown.get(&level).copied().unwrap_or(0),
        })
        .collect();

    Ok(ProgressStats {
        user_id: user_id.to_string(),
        words_studied: totals.words_studied,
        total_reviews: totals.total_reviews,
        total_correct: totals.total_correct,
        accuracy_percentage: accuracy(totals.total_correct, totals.total_reviews),
        mastery_breakdown,
        studied_by_level: totals.studied_by_level,
        recent_quizzes,
    })
}

/// Deletes every progress record, quiz result and pending quiz of the
/// learner. Refuses to run unless `confirm` is set.
pub async fn clear(
    db: &Database,
    user_id: &str,
    confirm: bool,
) -> Result<ClearedProgress, ServiceError> {
    if !confirm {
        return Err(ServiceError::validation(
            "clearing progress requires confirm=true",
        ));
    }
    ensure_learner(db, user_id).await?;

    let mut tx = db.pool().begin().await?;
    let cleared = operations::clear_progress(&mut tx, user_id).await?;
    tx.commit().await?;

    tracing::warn!(
        user_id,
        progress_records = cleared.progress_records,
        quiz_results = cleared.quiz_results,
        "learner progress cleared"
    );
    Ok(cleared)
}

/// Correct share of all reviews as a percentage with two decimals.
pub fn accuracy(correct: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = correct as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}
