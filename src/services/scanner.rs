use std::sync::Arc;

use tokio::time::interval;

use crate::business_logic::aggregate::{summarize, InstrumentTally};
use crate::business_logic::config::{DetectorConfig, ScanSettings};
use crate::business_logic::double_top::{detect_double_tops, PatternCandidate};
use crate::errors::DetectionError;
use crate::models::double_top::{CoinScanResult, ScanSnapshot};
use crate::models::series::PriceSeries;
use crate::services::hyperliquid::HyperliquidClient;
use crate::services::market_data::MarketDataService;
use crate::services::scan_state::SharedScanState;

/// Batch scanner that runs double top detection over every configured coin
pub struct ScanService {
    market_data: MarketDataService,
    settings: ScanSettings,
    config: DetectorConfig,
    shared_state: SharedScanState,
}

impl ScanService {
    pub fn new(
        client: Arc<HyperliquidClient>,
        settings: ScanSettings,
        config: DetectorConfig,
        shared_state: SharedScanState,
    ) -> Self {
        Self {
            market_data: MarketDataService::new(client),
            settings,
            config,
            shared_state,
        }
    }

    /// Scan on every tick; the first tick fires immediately
    pub async fn run(&self) {
        let mut ticker = interval(self.settings.poll_interval);

        loop {
            ticker.tick().await;

            let snapshot = self.scan_all().await;
            self.publish(snapshot).await;
        }
    }

    /// Scan all coins once. A coin that fails to load is reported, not fatal.
    pub async fn scan_all(&self) -> ScanSnapshot {
        let interval = &self.settings.interval;
        let mut results = Vec::with_capacity(self.settings.coins.len());

        for coin in &self.settings.coins {
            let result = match self
                .market_data
                .fetch_series(coin, interval, self.settings.candles)
                .await
            {
                Ok(series) => match scan_series(coin, interval, &series, &self.config) {
                    Ok(result) => {
                        log_recent_patterns(coin, &result.candidates, series.len(), &self.config);
                        result
                    }
                    Err(e) => {
                        tracing::error!("[{}] detection failed: {}", coin, e);
                        failed_result(coin, interval, e.to_string())
                    }
                },
                Err(e) => {
                    tracing::error!("[{}] failed to load candles: {:#}", coin, e);
                    failed_result(coin, interval, format!("{e:#}"))
                }
            };

            tracing::info!("{}", result.summary);
            results.push(result);
        }

        let summary = summarize(results.iter().map(|r| r.tally.clone()).collect());
        tracing::info!(
            "Scan complete: {} candidates across {} coins, {} confirmed ({})",
            summary.total_candidates,
            results.len(),
            summary.total_confirmed,
            format_proportion(summary.confirmed_proportion)
        );

        ScanSnapshot {
            as_of_ms: chrono::Utc::now().timestamp_millis() as u64,
            results,
            summary,
        }
    }

    async fn publish(&self, snapshot: ScanSnapshot) {
        let mut state = self.shared_state.snapshot.write().await;
        *state = snapshot.clone();
        drop(state);
        let _ = self.shared_state.broadcaster.send(snapshot);
    }
}

/// Run detection on one series and package the result
pub fn scan_series(
    coin: &str,
    interval: &str,
    series: &PriceSeries,
    config: &DetectorConfig,
) -> Result<CoinScanResult, DetectionError> {
    let candidates = detect_double_tops(series, config)?;
    let tally = InstrumentTally::from_candidates(coin, &candidates);
    let summary = build_summary(coin, series.len(), &candidates, &tally);

    Ok(CoinScanResult {
        coin: coin.to_string(),
        interval: interval.to_string(),
        bars: series.len(),
        candidates,
        tally,
        summary,
        error: None,
    })
}

fn failed_result(coin: &str, interval: &str, error: String) -> CoinScanResult {
    CoinScanResult {
        coin: coin.to_string(),
        interval: interval.to_string(),
        bars: 0,
        candidates: Vec::new(),
        tally: InstrumentTally::from_candidates(coin, &[]),
        summary: format!("{coin}: scan failed."),
        error: Some(error),
    }
}

/// Second peak close enough to the end of the series that its lookahead window is still open
fn is_recent(candidate: &PatternCandidate, bars: usize, config: &DetectorConfig) -> bool {
    candidate
        .second_peak_index
        .saturating_add(config.lookahead)
        .saturating_add(1)
        >= bars
}

fn log_recent_patterns(
    coin: &str,
    candidates: &[PatternCandidate],
    bars: usize,
    config: &DetectorConfig,
) {
    for candidate in candidates.iter().filter(|c| is_recent(c, bars, config)) {
        match (candidate.breakdown_date, candidate.confirmed) {
            (Some(date), true) => tracing::warn!(
                "CONFIRMED: Double top on {} - peaks ${} / ${}, broke neckline ${} on {}",
                coin,
                format_price(candidate.first_peak_price),
                format_price(candidate.second_peak_price),
                format_price(candidate.trough_price),
                date.format("%Y-%m-%d")
            ),
            _ => tracing::info!(
                "FORMING: Double top on {} - peaks ${} / ${}, neckline ${} not yet broken",
                coin,
                format_price(candidate.first_peak_price),
                format_price(candidate.second_peak_price),
                format_price(candidate.trough_price)
            ),
        }
    }
}

fn build_summary(
    coin: &str,
    bars: usize,
    candidates: &[PatternCandidate],
    tally: &InstrumentTally,
) -> String {
    let latest = candidates
        .iter()
        .max_by_key(|c| (c.second_peak_index, c.first_peak_index));

    match latest {
        None => format!("{coin}: no double tops in {bars} bars."),
        Some(latest) => {
            let status = match latest.breakdown_date {
                Some(date) => format!("confirmed on {}", date.format("%Y-%m-%d")),
                None => "unconfirmed".to_string(),
            };
            format!(
                "{coin}: {} double tops in {bars} bars ({} confirmed, {} unconfirmed); latest peaks ${} / ${} with neckline ${}, {status}.",
                tally.total(),
                tally.confirmed,
                tally.unconfirmed,
                format_price(latest.first_peak_price),
                format_price(latest.second_peak_price),
                format_price(latest.trough_price),
            )
        }
    }
}

fn format_proportion(proportion: Option<f64>) -> String {
    match proportion {
        Some(value) => format!("{:.1}%", value * 100.0),
        None => "undefined, no candidates".to_string(),
    }
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}
