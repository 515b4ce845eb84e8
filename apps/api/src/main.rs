use axum::{Json, Router, routing::get};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{
    AuthService, InMemoryUserRepository, PgUserRepository, UserRepository, UserService,
    handlers::{self, UsersState},
};
use migration::{Migrator, MigratorTrait};
use tracing::info;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let app = match &config.database {
        Some(database) => {
            info!("Connecting to PostgreSQL");
            let db = sea_orm::Database::connect(&database.url).await?;
            Migrator::up(&db, None).await?;
            users_router(PgUserRepository::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; running on the in-memory user store");
            users_router(InMemoryUserRepository::new())
        }
    }
    .route("/health", get(health));

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "Starting conduit API");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Conduit API shutdown complete");
    Ok(())
}

/// Assemble the users routes over a concrete repository.
fn users_router<R>(repository: R) -> Router
where
    R: UserRepository + Clone + 'static,
{
    let state = UsersState {
        users: UserService::new(repository.clone()),
        auth: AuthService::new(repository),
    };
    handlers::router(state)
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    name: &'static str,
    version: &'static str,
}

/// Liveness check
///
/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
