use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use super::progress::{map_progress_row, ProgressRecord};
use super::format_timestamp;
use crate::db::Database;

const VOCAB_COLUMNS: &str = r#"v."id", v."hanzi", v."pinyin", v."english", v."hskLevel", v."wordType", v."exampleSentence""#;
const PROGRESS_COLUMNS: &str = r#"p."wordId", p."masteryLevel", p."reviewCount", p."correctCount", p."nextReviewDate", p."lastReviewedAt""#;

/// HSK proficiency level, 1 (easiest) to 6 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct HskLevel(u8);

impl HskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = HskLevel> {
        (Self::MIN..=Self::MAX).map(HskLevel)
    }
}

impl TryFrom<i64> for HskLevel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        HskLevel::new(value).ok_or_else(|| format!("HSK level must be between 1 and 6, got {value}"))
    }
}

impl From<HskLevel> for i64 {
    fn from(level: HskLevel) -> Self {
        level.0 as i64
    }
}

impl fmt::Display for HskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub id: i64,
    pub hanzi: String,
    pub pinyin: String,
    pub english: String,
    pub hsk_level: i64,
    pub word_type: Option<String>,
    pub example_sentence: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVocabulary {
    pub hanzi: String,
    pub pinyin: String,
    pub english: String,
    pub hsk_level: HskLevel,
    pub word_type: Option<String>,
    pub example_sentence: Option<String>,
}

/// A vocabulary entry together with the learner's progress on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudiedWord {
    #[serde(flatten)]
    pub entry: VocabularyEntry,
    pub progress: ProgressRecord,
}

/// Export row: every entry plus the learner's mastery (0 when unseen).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMastery {
    pub entry: VocabularyEntry,
    pub mastery_level: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCounts {
    pub total: i64,
    pub by_level: BTreeMap<i64, i64>,
    pub by_word_type: Vec<(String, i64)>,
}

/// Inserts an entry, ignoring duplicates of `(hanzi, hskLevel)`.
/// Returns the new id, or `None` when the entry already existed.
pub async fn insert_vocabulary(
    conn: &mut SqliteConnection,
    entry: &NewVocabulary,
) -> Result<Option<i64>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO "vocabulary"
          ("hanzi", "pinyin", "english", "hskLevel", "wordType", "exampleSentence")
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.hanzi)
    .bind(&entry.pinyin)
    .bind(&entry.english)
    .bind(i64::from(entry.hsk_level))
    .bind(&entry.word_type)
    .bind(&entry.example_sentence)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(result.last_insert_rowid()))
}

pub async fn get_vocabulary(db: &Database, id: i64) -> Result<Option<VocabularyEntry>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"SELECT {VOCAB_COLUMNS} FROM "vocabulary" v WHERE v."id" = ? LIMIT 1"#
    ))
    .bind(id)
    .fetch_optional(db.pool())
    .await?;
    Ok(row.map(|r| map_vocabulary_row(&r)))
}

pub async fn list_vocabulary_by_level(
    db: &Database,
    level: HskLevel,
    limit: Option<i64>,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS} FROM "vocabulary" v WHERE v."hskLevel" = "#
    ));
    qb.push_bind(i64::from(level));
    qb.push(r#" ORDER BY v."id""#);
    if let Some(limit) = limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
    }

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_vocabulary_row).collect())
}

pub async fn list_vocabulary_by_word_type(
    db: &Database,
    word_type: &str,
    level: Option<HskLevel>,
    limit: i64,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS} FROM "vocabulary" v WHERE LOWER(v."wordType") = LOWER("#
    ));
    qb.push_bind(word_type);
    qb.push(")");
    push_level_filter(&mut qb, level);
    qb.push(r#" ORDER BY v."hskLevel", v."hanzi" LIMIT "#);
    qb.push_bind(limit);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_vocabulary_row).collect())
}

/// Case-insensitive substring search over hanzi, pinyin and English.
pub async fn search_vocabulary(
    db: &Database,
    term: &str,
    level: Option<HskLevel>,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(term));

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS} FROM "vocabulary" v WHERE (v."hanzi" LIKE "#
    ));
    qb.push_bind(pattern.clone());
    qb.push(r#" ESCAPE '\' OR v."pinyin" LIKE "#);
    qb.push_bind(pattern.clone());
    qb.push(r#" ESCAPE '\' OR v."english" LIKE "#);
    qb.push_bind(pattern);
    qb.push(r#" ESCAPE '\')"#);
    push_level_filter(&mut qb, level);
    qb.push(r#" ORDER BY v."hskLevel", v."hanzi""#);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_vocabulary_row).collect())
}

pub async fn random_vocabulary(
    db: &Database,
    level: Option<HskLevel>,
    count: i64,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS} FROM "vocabulary" v WHERE 1 = 1"#
    ));
    push_level_filter(&mut qb, level);
    qb.push(" ORDER BY RANDOM() LIMIT ");
    qb.push_bind(count);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_vocabulary_row).collect())
}

/// Words at `level` the learner has never reviewed.
pub async fn list_unseen_vocabulary(
    db: &Database,
    user_id: &str,
    level: HskLevel,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {VOCAB_COLUMNS}
        FROM "vocabulary" v
        WHERE v."hskLevel" = ?
          AND NOT EXISTS (
            SELECT 1 FROM "word_progress" p
            WHERE p."wordId" = v."id" AND p."userId" = ? AND p."reviewCount" > 0
          )
        ORDER BY v."id"
        "#
    ))
    .bind(i64::from(level))
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;
    Ok(rows.iter().map(map_vocabulary_row).collect())
}

/// Words whose next review date is at or before `now`, oldest first.
pub async fn list_due_vocabulary(
    db: &Database,
    user_id: &str,
    level: Option<HskLevel>,
    now: DateTime<Utc>,
    count: i64,
) -> Result<Vec<StudiedWord>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS}, {PROGRESS_COLUMNS}
        FROM "vocabulary" v
        INNER JOIN "word_progress" p ON p."wordId" = v."id"
        WHERE p."userId" = "#
    ));
    qb.push_bind(user_id);
    qb.push(r#" AND p."nextReviewDate" <= "#);
    qb.push_bind(format_timestamp(now));
    push_level_filter(&mut qb, level);
    qb.push(r#" ORDER BY p."nextReviewDate" ASC LIMIT "#);
    qb.push_bind(count);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_studied_row).collect())
}

pub async fn list_vocabulary_by_mastery(
    db: &Database,
    user_id: &str,
    mastery_level: i64,
    level: Option<HskLevel>,
    limit: i64,
) -> Result<Vec<StudiedWord>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS}, {PROGRESS_COLUMNS}
        FROM "vocabulary" v
        INNER JOIN "word_progress" p ON p."wordId" = v."id"
        WHERE p."userId" = "#
    ));
    qb.push_bind(user_id);
    qb.push(r#" AND p."masteryLevel" = "#);
    qb.push_bind(mastery_level);
    push_level_filter(&mut qb, level);
    qb.push(r#" ORDER BY v."hskLevel", v."hanzi" LIMIT "#);
    qb.push_bind(limit);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows.iter().map(map_studied_row).collect())
}

pub async fn list_entries_with_mastery(
    db: &Database,
    user_id: &str,
    level: Option<HskLevel>,
    learned_only: bool,
) -> Result<Vec<EntryMastery>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {VOCAB_COLUMNS}, COALESCE(p."masteryLevel", 0) AS "mastery"
        FROM "vocabulary" v
        LEFT JOIN "word_progress" p ON p."wordId" = v."id" AND p."userId" = "#
    ));
    qb.push_bind(user_id);
    qb.push(" WHERE 1 = 1");
    push_level_filter(&mut qb, level);
    if learned_only {
        qb.push(r#" AND p."reviewCount" > 0"#);
    }
    qb.push(r#" ORDER BY v."hskLevel", v."id""#);

    let rows = qb.build().fetch_all(db.pool()).await?;
    Ok(rows
        .iter()
        .map(|row| EntryMastery {
            entry: map_vocabulary_row(row),
            mastery_level: row.try_get("mastery").unwrap_or(0),
        })
        .collect())
}

pub async fn count_vocabulary(db: &Database) -> Result<VocabularyCounts, sqlx::Error> {
    let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "vocabulary""#)
        .fetch_one(db.pool())
        .await?;

    let level_rows = sqlx::query(
        r#"SELECT "hskLevel", COUNT(*) AS "count" FROM "vocabulary" GROUP BY "hskLevel" ORDER BY "hskLevel""#,
    )
    .fetch_all(db.pool())
    .await?;
    let by_level = level_rows
        .iter()
        .map(|row| {
            (
                row.try_get::<i64, _>("hskLevel").unwrap_or_default(),
                row.try_get::<i64, _>("count").unwrap_or_default(),
            )
        })
        .collect();

    let type_rows = sqlx::query(
        r#"
        SELECT "wordType", COUNT(*) AS "count"
        FROM "vocabulary"
        WHERE "wordType" IS NOT NULL
        GROUP BY "wordType"
        ORDER BY "count" DESC, "wordType"
        "#,
    )
    .fetch_all(db.pool())
    .await?;
    let by_word_type = type_rows
        .iter()
        .map(|row| {
            (
                row.try_get::<String, _>("wordType").unwrap_or_default(),
                row.try_get::<i64, _>("count").unwrap_or_default(),
            )
        })
        .collect();

    Ok(VocabularyCounts {
        total,
        by_level,
        by_word_type,
    })
}

fn push_level_filter(qb: &mut QueryBuilder<'_, Sqlite>, level: Option<HskLevel>) {
    if let Some(level) = level {
        qb.push(r#" AND v."hskLevel" = "#);
        qb.push_bind(i64::from(level));
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn map_vocabulary_row(row: &SqliteRow) -> VocabularyEntry {
    VocabularyEntry {
        id: row.try_get("id").unwrap_or_default(),
        hanzi: row.try_get("hanzi").unwrap_or_default(),
        pinyin: row.try_get("pinyin").unwrap_or_default(),
        english: row.try_get("english").unwrap_or_default(),
        hsk_level: row.try_get("hskLevel").unwrap_or_default(),
        word_type: row.try_get("wordType").ok().flatten(),
        example_sentence: row.try_get("exampleSentence").ok().flatten(),
    }
}

fn map_studied_row(row: &SqliteRow) -> StudiedWord {
    StudiedWord {
        entry: map_vocabulary_row(row),
        progress: map_progress_row(row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsk_level_rejects_out_of_range() {
        assert!(HskLevel::new(0).is_none());
        assert!(HskLevel::new(7).is_none());
        assert_eq!(HskLevel::new(3).map(HskLevel::get), Some(3));
        assert_eq!(HskLevel::all().count(), 6);
    }

    #[test]
    fn hsk_level_deserializes_with_validation() {
        let level: HskLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level.get(), 2);
        assert!(serde_json::from_str::<HskLevel>("9").is_err());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("你好"), "你好");
    }
}
