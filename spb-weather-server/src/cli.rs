use anyhow::Context;
use clap::Parser;
use spb_weather_core::{Aggregator, Config, ProviderId};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

use crate::routes;

/// Top-level process arguments.
#[derive(Debug, Parser)]
#[command(
    name = "spb-weather-server",
    version,
    about = "Current Saint Petersburg weather from Tomorrow.io and Stormglass"
)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "WEATHER_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "WEATHER_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_logging(self.log_json);

        let config = Config::from_env();
        for id in ProviderId::all() {
            if !config.is_provider_configured(*id) {
                warn!(provider = %id, "No API key configured, upstream calls will be rejected");
            }
        }

        let app = routes::build_router(Arc::new(Aggregator::from_config(&config)));

        let listener = tokio::net::TcpListener::bind(self.listen)
            .await
            .with_context(|| format!("Failed to bind {}", self.listen))?;

        info!(addr = %self.listen, "Weather server listening");

        axum::serve(listener, app).await.context("Weather server error")?;

        Ok(())
    }
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("spb_weather_server=info,spb_weather_core=info,tower_http=info")
    });

    if json {
        fmt().json().with_env_filter(env_filter).with_target(true).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
