use financial_planner_agent::{
    api::start_server, gemini::GeminiClient, AppConfig, FinancialAgent,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load .env + environment once; everything below borrows from it
    let config = AppConfig::from_env()?;

    if config.gemini.api_key.is_empty() {
        warn!("GEMINI_API_KEY not set; /chat will fail until it is configured");
    }

    info!("Financial Planner Agent - API Server");
    info!(model = %config.gemini.model, "Using Gemini model");

    let model = Arc::new(GeminiClient::new(&config.gemini)?);
    let agent = Arc::new(FinancialAgent::new(model, &config.agent));

    info!("Agent initialized");

    start_server(agent, &config.server).await?;

    Ok(())
}
