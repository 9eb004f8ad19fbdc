use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use validator::Validate;

use crate::errors::AppError;
use crate::models::double_top::{CoinScanResult, ScanQuery, ScanSnapshot};
use crate::services::scanner::scan_series;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/double-top",
    responses(
        (status = 200, description = "Latest batch double top scan for all configured coins", body = ScanSnapshot)
    )
)]
pub async fn get_double_top_status(
    State(state): State<AppState>,
) -> Result<Json<ScanSnapshot>, AppError> {
    let snapshot = state.scan_state.snapshot.read().await.clone();
    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/double-top/stream",
    responses(
        (status = 200, description = "SSE stream of batch scan snapshots", content_type = "text/event-stream")
    )
)]
pub async fn get_double_top_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let initial_snapshot = state.scan_state.snapshot.read().await.clone();

    let initial_events = match snapshot_event(&initial_snapshot) {
        Some(event) => vec![Ok(event)],
        None => Vec::new(),
    };
    let initial_stream = tokio_stream::iter(initial_events);

    let rx = state.scan_state.broadcaster.subscribe();
    let broadcast_stream = BroadcastStream::new(rx).filter_map(|message| match message {
        Ok(snapshot) => snapshot_event(&snapshot).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("stream subscriber lagged, skipped {} snapshots", skipped);
            None
        }
    });

    let stream = initial_stream.chain(broadcast_stream);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

#[utoipa::path(
    get,
    path = "/double-top/scan",
    params(ScanQuery),
    responses(
        (status = 200, description = "Double top candidates for one coin", body = CoinScanResult),
        (status = 400, description = "Invalid request or detector configuration", body = crate::errors::ErrorResponse),
        (status = 502, description = "Market data unavailable", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_double_top_scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<CoinScanResult>, AppError> {
    query
        .validate()
        .map_err(|err| AppError::Validation(err.to_string()))?;

    let config = query.detector_config();
    config.validate()?;

    let series = state
        .market_data
        .fetch_series(&query.coin, &query.interval, query.limit)
        .await
        .map_err(|error| AppError::Upstream(format!("{error:#}")))?;

    let result = scan_series(&query.coin, &query.interval, &series, &config)?;
    tracing::info!("on-demand scan: {}", result.summary);

    Ok(Json(result))
}

fn snapshot_event(snapshot: &ScanSnapshot) -> Option<Event> {
    let data = serde_json::to_string(snapshot).ok()?;
    Some(
        Event::default()
            .event("snapshot")
            .id(snapshot.as_of_ms.to_string())
            .data(data),
    )
}
