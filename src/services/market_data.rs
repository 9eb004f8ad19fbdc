use std::sync::Arc;

use anyhow::Context;

use crate::models::candle::Candle;
use crate::models::interval::interval_ms;
use crate::models::series::PriceSeries;
use crate::services::hyperliquid::HyperliquidClient;

/// Turns Hyperliquid candles into closed-bar price series
pub struct MarketDataService {
    client: Arc<HyperliquidClient>,
}

impl MarketDataService {
    pub fn new(client: Arc<HyperliquidClient>) -> Self {
        Self { client }
    }

    /// Fetch the last `limit` closed candles for a coin as a series
    pub async fn fetch_series(
        &self,
        coin: &str,
        interval: &str,
        limit: usize,
    ) -> anyhow::Result<PriceSeries> {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        let interval_ms = interval_ms(interval).context("unsupported interval")?;
        let (start_time, end_time) = build_time_range(now_ms, interval_ms, limit);

        let candles = self
            .client
            .fetch_candles(coin, interval, start_time, end_time)
            .await
            .context("failed to fetch candle snapshot")?;
        let candles = closed_candles(candles, now_ms);

        PriceSeries::from_candles(&candles)
            .with_context(|| format!("malformed candles for {coin}"))
    }
}

fn build_time_range(now_ms: u64, interval_ms: u64, limit: usize) -> (u64, u64) {
    let span = interval_ms.saturating_mul(limit as u64);
    let start_time = now_ms.saturating_sub(span);
    (start_time, now_ms)
}

/// Drop the still-open candle and order by open time, keeping the first of any duplicates
fn closed_candles(mut candles: Vec<Candle>, now_ms: u64) -> Vec<Candle> {
    candles.retain(|candle| candle.is_closed(now_ms));
    candles.sort_by_key(|candle| candle.open_time);
    candles.dedup_by_key(|candle| candle.open_time);
    candles
}
