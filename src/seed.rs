//! Loads the HSK vocabulary dataset into the database.
//!
//! The dataset is a JSON object keyed by `hsk1` .. `hsk6`, each holding a
//! list of words.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::operations::{self, HskLevel, NewVocabulary};
use crate::db::Database;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid dataset key '{0}', expected hsk1..hsk6")]
    UnknownLevel(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetWord {
    #[serde(alias = "hanzi")]
    chinese: String,
    pinyin: String,
    english: String,
    #[serde(default)]
    word_type: Option<String>,
    #[serde(default)]
    example_sentence: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn parse_dataset(json: &str) -> Result<Vec<NewVocabulary>, SeedError> {
    let levels: BTreeMap<String, Vec<DatasetWord>> = serde_json::from_str(json)?;
    let mut words = Vec::new();

    for (key, entries) in levels {
        let level = key
            .strip_prefix("hsk")
            .and_then(|n| n.parse::<i64>().ok())
            .and_then(HskLevel::new)
            .ok_or_else(|| SeedError::UnknownLevel(key.clone()))?;

        words.extend(entries.into_iter().map(|word| NewVocabulary {
            hanzi: word.chinese.trim().to_string(),
            pinyin: word.pinyin.trim().to_string(),
            english: word.english.trim().to_string(),
            hsk_level: level,
            word_type: word.word_type.filter(|w| !w.trim().is_empty()),
            example_sentence: word.example_sentence.filter(|s| !s.trim().is_empty()),
        }));
    }

    Ok(words)
}

pub async fn read_dataset(path: &Path) -> Result<Vec<NewVocabulary>, SeedError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_dataset(&json)
}

/// Inserts every word in one transaction. Words already present at the same
/// level are skipped.
pub async fn load_vocabulary(
    db: &Database,
    words: &[NewVocabulary],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let mut tx = db.pool().begin().await?;
    for word in words {
        match operations::insert_vocabulary(&mut tx, word).await? {
            Some(_) => report.inserted += 1,
            None => report.skipped += 1,
        }
    }
    tx.commit().await?;

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "vocabulary loaded"
    );
    Ok(report)
}

/// Seeds the vocabulary table from `path` when it is empty. A missing
/// dataset file is logged and leaves the table empty.
pub async fn seed_vocabulary_if_empty(db: &Database, path: &Path) -> Result<SeedReport, SeedError> {
    let counts = operations::count_vocabulary(db).await?;
    if counts.total > 0 {
        tracing::debug!(total = counts.total, "vocabulary already seeded");
        return Ok(SeedReport::default());
    }

    if !path.exists() {
        tracing::warn!(path = %path.display(), "vocabulary dataset not found, skipping seed");
        return Ok(SeedReport::default());
    }

    let words = read_dataset(path).await?;
    load_vocabulary(db, &words).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_and_hanzi_alias() {
        let json = r#"{
            "hsk1": [{"chinese": "你好", "pinyin": "nǐ hǎo", "english": "hello", "word_type": "phrase"}],
            "hsk2": [{"hanzi": "咖啡", "pinyin": "kā fēi", "english": "coffee"}]
        }"#;
        let words = parse_dataset(json).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].hanzi, "你好");
        assert_eq!(words[0].hsk_level.get(), 1);
        assert_eq!(words[0].word_type.as_deref(), Some("phrase"));
        assert_eq!(words[1].hanzi, "咖啡");
        assert_eq!(words[1].hsk_level.get(), 2);
        assert!(words[1].word_type.is_none());
    }

    #[test]
    fn rejects_unknown_level_keys() {
        let err = parse_dataset(r#"{"hsk9": []}"#).unwrap_err();
        assert!(matches!(err, SeedError::UnknownLevel(key) if key == "hsk9"));
        assert!(parse_dataset(r#"{"level1": []}"#).is_err());
    }

    #[test]
    fn bundled_dataset_is_valid() {
        let json = include_str!("../data/hsk_vocabulary.json");
        let words = parse_dataset(json).unwrap();
        assert!(!words.is_empty());
        for level in HskLevel::all() {
            assert!(words.iter().any(|w| w.hsk_level == level));
        }
    }
}
