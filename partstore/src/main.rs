use partstore::{AppState, Migrator, api, config::Config, telemetry};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_filter)?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let app = api::router(AppState::new(db, config.default_model));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(bind = %config.bind, default_model = %config.default_model, "partstore listening; docs at /docs");
    axum::serve(listener, app).await?;
    Ok(())
}
