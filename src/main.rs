use anyhow::Context;
use tracing::{Level, info};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ai_llm_service::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file. A missing file is fine:
    // containers pass the variables directly.
    let dotenv = dotenvy::dotenv();

    let app_layer = fmt::layer()
        .with_target(true)
        .compact()
        .with_filter(filter::filter_fn(|meta| {
            !telemetry::is_own_target(meta.target())
        }));

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(app_layer)
        .with(telemetry::layer())
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => return Err(e).context("failed to read .env"),
    }

    let config = api::AppConfig::from_env().context("invalid configuration")?;
    api::start(config).await.context("server failed")?;

    Ok(())
}
