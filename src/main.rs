mod business_logic;
mod errors;
mod handlers;
mod models;
mod services;
mod state;

use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::business_logic::aggregate::{BatchSummary, InstrumentTally};
use crate::business_logic::config::{DetectorConfig, ScanSettings};
use crate::business_logic::double_top::PatternCandidate;
use crate::handlers::double_top::{get_double_top_scan, get_double_top_status, get_double_top_stream};
use crate::models::double_top::{CoinScanResult, ScanSnapshot};
use crate::models::health::HealthResponse;
use crate::services::hyperliquid::HyperliquidClient;
use crate::services::market_data::MarketDataService;
use crate::services::scan_state::new_shared_state;
use crate::services::scanner::ScanService;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::double_top::get_double_top_status,
        handlers::double_top::get_double_top_stream,
        handlers::double_top::get_double_top_scan
    ),
    components(schemas(
        HealthResponse,
        ScanSnapshot,
        CoinScanResult,
        PatternCandidate,
        InstrumentTally,
        BatchSummary,
        errors::ErrorResponse
    ))
)]
struct ApiDoc;

/// Stdout logging, plus a daily rolling file when a log dir is configured.
/// The returned guard must live as long as the process to flush file output.
fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "topscreener=info,tower_http=debug".into());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "topscreener.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ScanSettings::from_env().context("invalid screener settings")?;
    let _log_guard = init_tracing(settings.log_dir.as_deref());

    let config = DetectorConfig::default();
    config.validate().context("invalid detector configuration")?;

    let scan_state = new_shared_state();
    let client = Arc::new(HyperliquidClient::new());

    // Start batch scanning in background
    tracing::info!(
        "Scanning {} on {} candles every {}s",
        settings.coins.join(", "),
        settings.interval,
        settings.poll_interval.as_secs()
    );
    let scanner = ScanService::new(client.clone(), settings.clone(), config, scan_state.clone());
    tokio::spawn(async move {
        scanner.run().await;
    });

    let app_state = AppState {
        scan_state,
        market_data: Arc::new(MarketDataService::new(client)),
    };

    // Start web server
    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/double-top", get(get_double_top_status))
        .route("/double-top/stream", get(get_double_top_stream))
        .route("/double-top/scan", get(get_double_top_scan))
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!("Server running on http://{}", settings.bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", settings.bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
