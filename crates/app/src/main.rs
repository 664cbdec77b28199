use std::{net::SocketAddr, sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use engine::{IdentityVerifier, TokenKeys};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "listify={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    if settings.auth.jwt_secret == "dev-secret" {
        tracing::warn!("using the development JWT secret, set LISTIFY__AUTH__JWT_SECRET");
    }

    let db = parse_database(&settings.server.database).await?;
    let tokens = TokenKeys::from_secret(
        settings.auth.jwt_secret.as_bytes(),
        Duration::hours(settings.auth.token_ttl_hours),
    );
    let google: Arc<dyn IdentityVerifier> = Arc::new(server::GoogleVerifier::new(
        settings.auth.google_client_id.clone(),
        StdDuration::from_secs(settings.auth.google_timeout_secs),
    )?);

    let engine = engine::Engine::builder()
        .database(db)
        .tokens(tokens)
        .identity_verifier(google)
        .build()
        .await?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener, settings.cors.origins).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
