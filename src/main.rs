use anyhow::Result;
use tracing::info;

use ai_sentinel::config::{Config, LogFormat};
use ai_sentinel::dashboard::{start_dashboard, AppState};
use ai_sentinel::geo::GeoDataset;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ai_sentinel=info,tower_http=info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!("NEXUS: GLOBAL AI SENTINEL starting");

    // Country dataset is fetched once; failures fall back to a minimal set
    let geo = GeoDataset::load(&config).await;

    let state = AppState::new(&config, geo)?;
    start_dashboard(&config, state).await?;

    info!("Dashboard stopped");
    Ok(())
}
