use financial_planner_agent::{gemini::GeminiClient, AppConfig, FinancialAgent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_PROMPT: &str =
    "Calculate the future value of an investment of $1000 at an interest rate of 5% for 10 years.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = AppConfig::from_env()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let prompt = if args.is_empty() {
        DEMO_PROMPT.to_string()
    } else {
        args.join(" ")
    };

    let model = Arc::new(GeminiClient::new(&config.gemini)?);
    let agent = FinancialAgent::new(model, &config.agent);

    info!(prompt = %prompt, "Running one-shot query");

    match agent.respond(&prompt, &[]).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
