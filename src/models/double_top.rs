use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::business_logic::aggregate::{BatchSummary, InstrumentTally};
use crate::business_logic::config::DetectorConfig;
use crate::business_logic::double_top::PatternCandidate;
use crate::models::interval::validate_interval;

/// Query for an on-demand scan of a single coin
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct ScanQuery {
    #[validate(length(min = 1, max = 24))]
    #[param(example = "BTC")]
    pub coin: String,
    /// Candle interval. Supported: 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 8h, 12h, 1d, 3d, 1w, 1M.
    #[serde(default = "default_interval")]
    #[validate(custom(function = "validate_interval"))]
    #[param(example = "1d", default = "1d")]
    pub interval: String,
    /// Number of candles to scan
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 5000))]
    #[param(example = 1000, default = 1000)]
    pub limit: usize,
    /// Local maximum window radius
    #[serde(default = "default_window")]
    #[validate(range(min = 1, max = 2500))]
    #[param(default = 15)]
    pub window: usize,
    #[serde(default = "default_min_separation")]
    #[param(default = 5)]
    pub min_separation: usize,
    #[serde(default = "default_max_separation")]
    #[param(default = 90)]
    pub max_separation: usize,
    /// Max relative difference between the two peaks
    #[serde(default = "default_tolerance")]
    #[param(default = 0.01)]
    pub tolerance: f64,
    /// Required drop below the neckline to confirm
    #[serde(default = "default_min_drop")]
    #[param(default = 0.03)]
    pub min_drop: f64,
    /// Bars after the second peak searched for a breakdown
    #[serde(default = "default_lookahead")]
    #[param(default = 30)]
    pub lookahead: usize,
}

impl ScanQuery {
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            window: self.window,
            min_separation: self.min_separation,
            max_separation: self.max_separation,
            tolerance: self.tolerance,
            min_drop: self.min_drop,
            lookahead: self.lookahead,
        }
    }
}

/// Detection result for one coin
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoinScanResult {
    pub coin: String,
    pub interval: String,
    /// Closed candles scanned
    pub bars: usize,
    pub candidates: Vec<PatternCandidate>,
    pub tally: InstrumentTally,
    pub summary: String,
    /// Set when the coin could not be scanned this cycle
    pub error: Option<String>,
}

/// Latest batch scan across all configured coins
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanSnapshot {
    pub as_of_ms: u64,
    pub results: Vec<CoinScanResult>,
    pub summary: BatchSummary,
}

impl ScanSnapshot {
    pub fn empty() -> Self {
        Self {
            as_of_ms: 0,
            results: Vec::new(),
            summary: BatchSummary::empty(),
        }
    }
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_limit() -> usize {
    1000
}

fn default_window() -> usize {
    DetectorConfig::default().window
}

fn default_min_separation() -> usize {
    DetectorConfig::default().min_separation
}

fn default_max_separation() -> usize {
    DetectorConfig::default().max_separation
}

fn default_tolerance() -> f64 {
    DetectorConfig::default().tolerance
}

fn default_min_drop() -> f64 {
    DetectorConfig::default().min_drop
}

fn default_lookahead() -> usize {
    DetectorConfig::default().lookahead
}
