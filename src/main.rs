use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: variables may come from the process environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .with(telemetry::external_layer())
        .init();

    if let Err(e) = dotenv {
        warn!(error = %e, ".env not loaded");
    }

    api::start().await?;

    Ok(())
}
