use std::collections::BTreeMap;

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::scheduling::{MAX_MASTERY, MIN_MASTERY};
use super::{ensure_learner, ServiceError};
use crate::db::operations::{self, HskLevel, StudiedWord, VocabularyEntry};
use crate::db::Database;

pub const MAX_SEARCH_TERM_LEN: usize = 100;
pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 100;
pub const DEFAULT_BATCH: i64 = 5;
pub const MAX_BATCH: i64 = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyStatistics {
    pub total_vocabulary: i64,
    pub learned_vocabulary: i64,
    pub new_vocabulary: i64,
    pub hsk_level_counts: BTreeMap<i64, i64>,
    pub word_type_counts: Vec<(String, i64)>,
}

pub async fn get_entry(db: &Database, id: i64) -> Result<VocabularyEntry, ServiceError> {
    operations::get_vocabulary(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("word {id} does not exist")))
}

pub async fn list_by_level(
    db: &Database,
    level: HskLevel,
    limit: i64,
) -> Result<Vec<VocabularyEntry>, ServiceError> {
    Ok(operations::list_vocabulary_by_level(db, level, Some(limit)).await?)
}

pub async fn list_by_word_type(
    db: &Database,
    word_type: &str,
    level: Option<HskLevel>,
    limit: i64,
) -> Result<Vec<VocabularyEntry>, ServiceError> {
    let word_type = word_type.trim();
    if word_type.is_empty() {
        return Err(ServiceError::validation("word_type must not be empty"));
    }
    Ok(operations::list_vocabulary_by_word_type(db, word_type, level, limit).await?)
}

pub async fn search(
    db: &Database,
    term: &str,
    level: Option<HskLevel>,
) -> Result<Vec<VocabularyEntry>, ServiceError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ServiceError::validation("search_term must not be empty"));
    }
    if term.chars().count() > MAX_SEARCH_TERM_LEN {
        return Err(ServiceError::validation(format!(
            "search_term must be at most {MAX_SEARCH_TERM_LEN} characters"
        )));
    }
    Ok(operations::search_vocabulary(db, term, level).await?)
}

/// Up to `count` words at `level` the learner has not reviewed yet, in
/// random order.
pub async fn learn_new(
    db: &Database,
    user_id: &str,
    level: HskLevel,
    count: i64,
) -> Result<Vec<VocabularyEntry>, ServiceError> {
    ensure_learner(db, user_id).await?;
    let mut unseen = operations::list_unseen_vocabulary(db, user_id, level).await?;
    unseen.shuffle(&mut rand::rng());
    unseen.truncate(count as usize);
    Ok(unseen)
}

pub async fn review_due(
    db: &Database,
    user_id: &str,
    level: Option<HskLevel>,
    count: i64,
) -> Result<Vec<StudiedWord>, ServiceError> {
    ensure_learner(db, user_id).await?;
    Ok(operations::list_due_vocabulary(db, user_id, level, Utc::now(), count).await?)
}

pub async fn random(
    db: &Database,
    level: Option<HskLevel>,
    count: i64,
) -> Result<Vec<VocabularyEntry>, ServiceError> {
    Ok(operations::random_vocabulary(db, level, count).await?)
}

pub async fn list_by_mastery(
    db: &Database,
    user_id: &str,
    mastery_level: i64,
    level: Option<HskLevel>,
    limit: i64,
) -> Result<Vec<StudiedWord>, ServiceError> {
    if !(MIN_MASTERY..=MAX_MASTERY).contains(&mastery_level) {
        return Err(ServiceError::validation(format!(
            "mastery level must be between {MIN_MASTERY} and {MAX_MASTERY}, got {mastery_level}"
        )));
    }
    ensure_learner(db, user_id).await?;
    Ok(operations::list_vocabulary_by_mastery(db, user_id, mastery_level, level, limit).await?)
}

pub async fn statistics(db: &Database, user_id: &str) -> Result<VocabularyStatistics, ServiceError> {
    ensure_learner(db, user_id).await?;
    let counts = operations::count_vocabulary(db).await?;
    let learned = operations::progress_totals(db, user_id).await?.words_studied;

    Ok(VocabularyStatistics {
        total_vocabulary: counts.total,
        learned_vocabulary: learned,
        new_vocabulary: (counts.total - learned).max(0),
        hsk_level_counts: counts.by_level,
        word_type_counts: counts.by_word_type,
    })
}
