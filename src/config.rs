use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::db::config::DbConfig;
use crate::db::LOCAL_USER_ID;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database: DbConfig,
    pub vocabulary_path: PathBuf,
    pub export_dir: PathBuf,
    pub default_user_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            host,
            port,
            log_level,
            database: DbConfig::from_env(),
            vocabulary_path: env_path("VOCABULARY_PATH", "./data/hsk_vocabulary.json"),
            export_dir: env_path("EXPORT_DIR", "./exports"),
            default_user_id: std::env::var("DEFAULT_USER_ID")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| LOCAL_USER_ID.to_string()),
        }
    }

    /// Settings for an explicit database file, everything else at defaults.
    pub fn for_database(database: DbConfig) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            log_level: "info".to_string(),
            database,
            vocabulary_path: PathBuf::from("./data/hsk_vocabulary.json"),
            export_dir: PathBuf::from("./exports"),
            default_user_id: LOCAL_USER_ID.to_string(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_database_uses_local_learner() {
        let config = Config::for_database(DbConfig::at_path("/tmp/x.db"));
        assert_eq!(config.default_user_id, "local");
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let mut config = Config::for_database(DbConfig::at_path("x.db"));
        config.port = 8080;
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
    }
}
