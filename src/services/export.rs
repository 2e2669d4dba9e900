//! CSV export of vocabulary with the learner's mastery, importable as an
//! Anki deck.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use super::{ensure_learner, ServiceError};
use crate::db::operations::{self, EntryMastery, HskLevel};
use crate::db::Database;

pub const CSV_HEADER: [&str; 5] = ["hanzi", "pinyin", "english", "hsk_level", "mastery_level"];

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub hsk_level: Option<HskLevel>,
    pub learned_only: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Renders the export as CSV text.
pub async fn export_csv(
    db: &Database,
    user_id: &str,
    request: &ExportRequest,
) -> Result<(String, usize), ServiceError> {
    ensure_learner(db, user_id).await?;
    let entries =
        operations::list_entries_with_mastery(db, user_id, request.hsk_level, request.learned_only)
            .await?;
    let csv = render_csv(&entries)?;
    Ok((csv, entries.len()))
}

/// Writes the export to `export_dir/<sanitized filename>`.
pub async fn export_to_file(
    db: &Database,
    user_id: &str,
    request: &ExportRequest,
    export_dir: &Path,
    filename: Option<&str>,
) -> Result<ExportSummary, ServiceError> {
    let (csv, rows) = export_csv(db, user_id, request).await?;

    let filename = match filename {
        Some(name) => sanitize_filename(name)
            .ok_or_else(|| ServiceError::validation(format!("invalid export filename '{name}'")))?,
        None => default_filename(request.hsk_level),
    };

    tokio::fs::create_dir_all(export_dir).await?;
    let path = export_dir.join(filename);
    tokio::fs::write(&path, csv).await?;

    tracing::info!(user_id, path = %path.display(), rows, "vocabulary exported");
    Ok(ExportSummary { path, rows })
}

pub fn render_csv(entries: &[EntryMastery]) -> Result<String, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for item in entries {
        let hsk_level = item.entry.hsk_level.to_string();
        let mastery_level = item.mastery_level.to_string();
        writer.write_record([
            item.entry.hanzi.as_str(),
            item.entry.pinyin.as_str(),
            item.entry.english.as_str(),
            hsk_level.as_str(),
            mastery_level.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ServiceError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| {
        ServiceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// Reduces a user-supplied name to a bare `.csv` file name. Directory parts
/// are dropped and only `[A-Za-z0-9_-.]` survive.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let stem = base.strip_suffix(".csv").unwrap_or(base);
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    Some(format!("{cleaned}.csv"))
}

fn default_filename(level: Option<HskLevel>) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    match level {
        Some(level) => format!("hsk{level}_vocabulary_{stamp}.csv"),
        None => format!("hsk_vocabulary_{stamp}.csv"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::operations::VocabularyEntry;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("deck"), Some("deck.csv".to_string()));
        assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd.csv".to_string()));
        assert_eq!(sanitize_filename("my deck!.csv"), Some("mydeck.csv".to_string()));
        assert_eq!(sanitize_filename("C:\\tmp\\hsk1.csv"), Some("hsk1.csv".to_string()));
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let entries = vec![EntryMastery {
            entry: VocabularyEntry {
                id: 1,
                hanzi: "谢谢".to_string(),
                pinyin: "xiè xie".to_string(),
                english: "thank you, thanks".to_string(),
                hsk_level: 1,
                word_type: None,
                example_sentence: None,
            },
            mastery_level: 2,
        }];
        let csv = render_csv(&entries).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("hanzi,pinyin,english,hsk_level,mastery_level"));
        assert_eq!(lines.next(), Some("谢谢,xiè xie,\"thank you, thanks\",1,2"));
        assert_eq!(lines.next(), None);
    }
}
