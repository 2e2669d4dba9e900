use std::net::SocketAddr;

use hanzi_tutor::config::Config;
use hanzi_tutor::db::Database;
use hanzi_tutor::logging::{init_tracing, LogTarget};
use hanzi_tutor::services::users;
use hanzi_tutor::{create_app, seed};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, LogTarget::Stdout);

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

    let addr = config.bind_addr();
    let app = create_app(db.clone(), config);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "hanzi-tutor listening");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    db.close().await;
    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
