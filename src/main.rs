use agrotrust::{
    api::{self, state::AppState},
    auth::TokenService,
    config::{self, Settings},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Settings (a missing JWT_SECRET stops the server here)
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    info!(?settings, "Loaded settings");

    // 4. Database and schema
    let db = config::database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed privileged accounts
    let seed = config::seed::load_optional(&settings.seed_file)?;
    config::seed::seed_accounts(&db, &seed)
        .await
        .inspect_err(|e| error!("Failed to seed accounts: {}", e))?;

    // 6. Serve
    tokio::fs::create_dir_all(&settings.upload_dir).await?;
    let state = AppState::new(
        db,
        TokenService::new(&settings.jwt_secret, settings.jwt_expiry_seconds),
        settings.upload_dir.clone(),
    );
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, "AgroTrust API listening");

    axum::serve(listener, api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
