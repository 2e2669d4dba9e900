use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub journal_mode: SqliteJournalMode,
    pub busy_timeout: Duration,
    pub foreign_keys: bool,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let path = std::env::var("DATABASE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let journal_mode = std::env::var("SQLITE_JOURNAL_MODE")
            .ok()
            .as_deref()
            .and_then(SqliteJournalMode::parse)
            .unwrap_or(SqliteJournalMode::Wal);

        let busy_timeout_ms = env_u64("SQLITE_BUSY_TIMEOUT_MS", 5000);
        let foreign_keys = env_bool("SQLITE_FOREIGN_KEYS", true);
        let max_connections = env_u32("SQLITE_MAX_CONNECTIONS", 5);

        Self {
            path,
            journal_mode,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            foreign_keys,
            max_connections,
        }
    }

    /// Configuration for a database file at an explicit location, used by
    /// tests and the dataset loader.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            journal_mode: SqliteJournalMode::Wal,
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
            max_connections: 5,
        }
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hanzi-tutor")
        .join("learning.db")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    Wal,
    Delete,
    Truncate,
    Memory,
}

impl SqliteJournalMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "WAL" => Some(Self::Wal),
            "DELETE" => Some(Self::Delete),
            "TRUNCATE" => Some(Self::Truncate),
            "MEMORY" => Some(Self::Memory),
            _ => None,
        }
    }

    pub const fn as_sqlx(self) -> sqlx::sqlite::SqliteJournalMode {
        match self {
            SqliteJournalMode::Wal => sqlx::sqlite::SqliteJournalMode::Wal,
            SqliteJournalMode::Delete => sqlx::sqlite::SqliteJournalMode::Delete,
            SqliteJournalMode::Truncate => sqlx::sqlite::SqliteJournalMode::Truncate,
            SqliteJournalMode::Memory => sqlx::sqlite::SqliteJournalMode::Memory,
        }
    }
}

pub(crate) fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

pub(crate) fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_mode_parses_known_values() {
        assert_eq!(SqliteJournalMode::parse("WAL"), Some(SqliteJournalMode::Wal));
        assert_eq!(SqliteJournalMode::parse("MEMORY"), Some(SqliteJournalMode::Memory));
        assert_eq!(SqliteJournalMode::parse("wal"), None);
    }

    #[test]
    fn default_path_ends_with_database_file() {
        let path = default_db_path();
        assert!(path.ends_with("hanzi-tutor/learning.db"));
    }

    #[test]
    fn at_path_enables_foreign_keys() {
        let config = DbConfig::at_path("/tmp/x.db");
        assert!(config.foreign_keys);
        assert_eq!(config.journal_mode, SqliteJournalMode::Wal);
    }
}
