mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use kura_api::auth::{AppState, AppStateInner};
use kura_api::bootstrap;
use kura_api::routes::router;
use kura_api::uploads::UploadStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kura=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("KURA_JWT_SECRET is not set; using the development placeholder");
    }
    if config.legacy_login_provisioning {
        warn!(
            "Legacy login provisioning is on: logging in as '{}' recreates that account",
            config.bootstrap.super_username
        );
    }

    let db = kura_db::Database::open(&config.db_path)?;

    let report = bootstrap::run(&db, &config.bootstrap)?;
    info!(
        "Bootstrap: founder created={}, super-admin created={}",
        report.founder_created, report.super_admin_created
    );

    let uploads = UploadStore::new(config.upload_dir.clone(), &config.upload_url_prefix).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: chrono::Duration::hours(config.token_ttl_hours),
        uploads,
        max_upload_bytes: config.max_upload_bytes(),
        bootstrap: config.bootstrap.clone(),
        legacy_login_provisioning: config.legacy_login_provisioning,
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Kura listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
