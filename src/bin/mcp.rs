use hanzi_tutor::config::Config;
use hanzi_tutor::db::Database;
use hanzi_tutor::logging::{init_tracing, LogTarget};
use hanzi_tutor::mcp::McpServer;
use hanzi_tutor::seed;
use hanzi_tutor::services::users;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    // Stdout belongs to the protocol.
    let _log_guard = init_tracing(&config.log_level, LogTarget::Stderr);

    let db = match Database::connect(config.database.clone()).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "failed to open database");
            std::process::exit(1);
        }
    };

    if let Err(err) = seed::seed_vocabulary_if_empty(&db, &config.vocabulary_path).await {
        tracing::error!(error = %err, "failed to seed vocabulary");
        std::process::exit(1);
    }

    if let Err(err) = users::ensure_default_learner(&db, &config.default_user_id).await {
        tracing::error!(error = %err, "failed to create default learner");
        std::process::exit(1);
    }

    let server = McpServer::new(db.clone(), config);
    if let Err(err) = server.run_stdio().await {
        tracing::error!(error = %err, "MCP server stopped with an I/O error");
    }
    db.close().await;
}
