use portfolio_advisor::{api::start_server, config::AdvisorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AdvisorConfig::from_env()?;

    info!("Portfolio Advisor - API Server");
    info!("Port: {}", config.port);
    info!("Simulated typing: {}", config.typing.enabled);

    start_server(config).await?;

    Ok(())
}
