use dentview::{config, db, routes, state};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "dentview failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = config::Config::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    let port = config.port;
    let state = state::AppState::new(pool, config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "dentview listening");
    axum::serve(listener, app).await?;
    Ok(())
}
