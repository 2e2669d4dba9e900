//! Loads an HSK dataset into the database, skipping words already present.
//!
//! Usage: `load-vocabulary [DATASET_PATH]`. Without an argument the path
//! comes from `VOCABULARY_PATH`.

use std::path::PathBuf;

use hanzi_tutor::config::Config;
use hanzi_tutor::db::Database;
use hanzi_tutor::logging::{init_tracing, LogTarget};
use hanzi_tutor::seed;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, LogTarget::Stderr);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.vocabulary_path.clone());

    let db = match Database::connect(config.database.clone()).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "failed to open database");
            std::process::exit(1);
        }
    };

    let words = match seed::read_dataset(&path).await {
        Ok(words) => words,
        Err(err) => {
            tracing::error!(error = %err, "failed to read dataset");
            std::process::exit(1);
        }
    };

    match seed::load_vocabulary(&db, &words).await {
        Ok(report) => println!(
            "Loaded {} words from {} ({} already present) into {}",
            report.inserted,
            path.display(),
            report.skipped,
            db.path().display()
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to load vocabulary");
            db.close().await;
            std::process::exit(1);
        }
    }
    db.close().await;
}
