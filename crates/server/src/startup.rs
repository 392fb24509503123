use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use common::env::ensure_upload_dir;
use configs::{AppConfig, CorsConfig, SeedConfig};
use migration::MigratorTrait;
use models::user::Role;
use sea_orm::DatabaseConnection;
use service::seed::{seed_accounts, SeedAccount};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

use crate::errors::set_expose_details;
use crate::routes;
use crate::state::ServerState;

/// Empty origin list means permissive CORS.
pub fn build_cors(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    if cfg.allowed_origins.is_empty() {
        return Ok(CorsLayer::very_permissive());
    }
    let origins = cfg
        .allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

pub fn seed_list(cfg: &SeedConfig) -> Vec<SeedAccount> {
    vec![
        SeedAccount { email: cfg.admin_email.clone(), password: cfg.admin_password.clone(), role: Role::Admin },
        SeedAccount { email: cfg.user_email.clone(), password: cfg.user_password.clone(), role: Role::User },
    ]
}

/// Assemble state and router on an already-migrated database.
pub async fn build_app(config: &AppConfig, db: DatabaseConnection) -> anyhow::Result<Router> {
    ensure_upload_dir(Path::new(&config.uploads.dir)).await?;
    let state = ServerState::new(db, config);
    if config.seed.enabled {
        let created = seed_accounts(&state.auth, &seed_list(&config.seed)).await;
        info!(created, "seed accounts ensured");
    }
    let cors = build_cors(&config.cors)?;
    Ok(routes::build_router(state, cors, config.uploads.max_body_bytes))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

/// Public entry: connect, migrate, build the app and serve until Ctrl+C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    set_expose_details(!config.app.is_production());

    let db = models::db::connect_with_config(&config.database)
        .await
        .context("connect database")?;
    if config.database.run_migrations {
        migration::Migrator::up(&db, None).await.context("run migrations")?;
        info!("migrations applied");
    }

    let app = build_app(&config, db).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, environment = %config.app.environment, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
