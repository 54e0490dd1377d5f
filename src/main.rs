use anyhow::Context;
use dotenvy::dotenv;

use stockroom::{
    config::Settings,
    create_router,
    database::{create_database_pool, run_migrations},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let settings = Settings::from_env()?;

    let db = create_database_pool(&settings)
        .await
        .context("failed to connect to database")?;
    run_migrations(&db).await.context("failed to run migrations")?;

    let addr = settings.bind_address();
    let app = create_router(AppState::new(db, settings));

    log::info!("stockroom listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
