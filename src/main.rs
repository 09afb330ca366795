//! Server: loads settings, ensures the database and tables exist, serves the API.

use ecommerce_api::{app, ensure_database_exists, ensure_tables, resolve, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ecommerce_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    if settings.ensure_database {
        ensure_database_exists(&settings.database_url).await?;
    }
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    ensure_tables(&pool).await?;

    let model = resolve()?;
    let state = AppState::new(pool, model);
    let router = app(state, settings.body_limit);

    let listener = TcpListener::bind(settings.socket_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
