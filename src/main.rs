mod actuator;
mod analysis;
mod api;
mod auth;
mod config;
mod data;
mod error;
mod mail;
mod monitor;
mod report;
mod scheduler;
mod source;

use std::sync::Arc;
use tokio::net::TcpListener;
use log::{info, error};
use tower_http::cors::CorsLayer;

use crate::actuator::Actuator;
use crate::api::{ApiState, create_api_router};
use crate::auth::TokenValidator;
use crate::config::Config;
use crate::data::{Market, TickerStore};
use crate::mail::{Mailer, SmtpMailer};
use crate::monitor::Monitor;
use crate::source::{build_http_client, AlphaVantageSource, QuoteSource, StooqSource};

fn build_monitor(
    config: &Config,
    market: Market,
    source: Arc<dyn QuoteSource>,
    mailer: Arc<dyn Mailer>,
) -> Arc<Monitor> {
    info!("📈 {} market quoted through {}", market, source.id());

    let actuator = Actuator::new(
        market,
        source,
        mailer,
        config.app_token.clone(),
        config.request_delay(),
    )
    .with_quote_dump_dir(config.quote_dump_dir.clone());

    Arc::new(Monitor::new(
        market,
        TickerStore::new(&config.data_dir, market),
        Arc::new(actuator),
        config.schedule_hour,
        config.schedule_minute,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger (before config, which may warn)
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = Config::from_env();

    // Log configuration
    config.log_config();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&config) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            error!("Mail configuration is invalid: {}", e);
            return Err(e.into());
        }
    };

    let client = build_http_client();
    let global_source: Arc<dyn QuoteSource> = Arc::new(AlphaVantageSource::new(
        client.clone(),
        config.alpha_vantage_api_key.clone(),
    ));
    let polish_source: Arc<dyn QuoteSource> = Arc::new(StooqSource::new(client));

    let monitors: Vec<Arc<Monitor>> = Market::ALL
        .iter()
        .map(|&market| {
            let source = match market {
                Market::Global => global_source.clone(),
                Market::Polish => polish_source.clone(),
            };
            build_monitor(&config, market, source, mailer.clone())
        })
        .collect();

    // Re-arm schedules persisted by a previous run
    for monitor in &monitors {
        monitor.restore();
        let (one_shot, recurring) = monitor.scheduler().active_timers();
        info!("[{}] Active timers: {} one-shot, {} recurring", monitor.market(), one_shot, recurring);
    }

    let api_state = ApiState {
        validator: Arc::new(TokenValidator::new(&config.app_token)),
        monitors,
    };

    let api_router = create_api_router(api_state)
        .layer(CorsLayer::permissive()); // Enable CORS for the upload page

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("🌐 HTTP API server running at http://{}", config.bind_address);

    if let Err(e) = axum::serve(listener, api_router).await {
        error!("API server stopped: {:?}", e);
        return Err(e.into());
    }

    Ok(())
}
