use std::time::Duration;

use anyhow::{bail, Context};

use crate::errors::DetectionError;
use crate::models::interval::interval_ms;

/// Configuration parameters for double top detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Local maximum window radius (bars on each side)
    pub window: usize,
    /// Min bars between the two peaks
    pub min_separation: usize,
    /// Max bars between the two peaks
    pub max_separation: usize,
    /// Max relative difference between peak prices (0.01 = 1%)
    pub tolerance: f64,
    /// Required fractional drop below the neckline to confirm (0.03 = 3%)
    pub min_drop: f64,
    /// Bars after the second peak to search for a breakdown
    pub lookahead: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: 15,
            min_separation: 5,
            max_separation: 90,
            tolerance: 0.01,
            min_drop: 0.03,
            lookahead: 30,
        }
    }
}

impl DetectorConfig {
    /// Reject configurations the detector cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.window < 1 {
            return Err(DetectionError::InvalidConfig(
                "window must be at least 1".to_string(),
            ));
        }
        if self.min_separation < 1 {
            return Err(DetectionError::InvalidConfig(
                "min_separation must be at least 1".to_string(),
            ));
        }
        if self.max_separation < self.min_separation {
            return Err(DetectionError::InvalidConfig(format!(
                "max_separation ({}) must not be less than min_separation ({})",
                self.max_separation, self.min_separation
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DetectionError::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.min_drop.is_finite() || self.min_drop < 0.0 {
            return Err(DetectionError::InvalidConfig(format!(
                "min_drop must be a non-negative number, got {}",
                self.min_drop
            )));
        }
        Ok(())
    }
}

/// Settings for the background batch scanner and the HTTP server
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Coins scanned on every cycle
    pub coins: Vec<String>,
    /// Candle interval fetched for each coin
    pub interval: String,
    /// Candles fetched per coin
    pub candles: usize,
    /// Delay between scan cycles
    pub poll_interval: Duration,
    /// HTTP listen address
    pub bind_addr: String,
    /// Directory for rolling log files; stdout only when unset
    pub log_dir: Option<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            coins: vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()],
            interval: "1d".to_string(),
            candles: 1000,
            poll_interval: Duration::from_secs(3600),
            bind_addr: "0.0.0.0:3000".to_string(),
            log_dir: None,
        }
    }
}

impl ScanSettings {
    /// Build settings from `SCREENER_*` environment variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(coins) = lookup("SCREENER_COINS") {
            settings.coins = coins
                .split(',')
                .map(|coin| coin.trim().to_uppercase())
                .filter(|coin| !coin.is_empty())
                .collect();
            if settings.coins.is_empty() {
                bail!("SCREENER_COINS must list at least one coin");
            }
        }

        if let Some(interval) = lookup("SCREENER_INTERVAL") {
            if interval_ms(&interval).is_none() {
                bail!("SCREENER_INTERVAL has unsupported value {interval}");
            }
            settings.interval = interval;
        }

        if let Some(candles) = lookup("SCREENER_CANDLES") {
            settings.candles = candles
                .parse()
                .with_context(|| format!("SCREENER_CANDLES is not a number: {candles}"))?;
            if settings.candles == 0 {
                bail!("SCREENER_CANDLES must be positive");
            }
        }

        if let Some(secs) = lookup("SCREENER_POLL_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("SCREENER_POLL_SECS is not a number: {secs}"))?;
            if secs == 0 {
                bail!("SCREENER_POLL_SECS must be positive");
            }
            settings.poll_interval = Duration::from_secs(secs);
        }

        if let Some(bind_addr) = lookup("SCREENER_BIND") {
            settings.bind_addr = bind_addr;
        }

        settings.log_dir = lookup("SCREENER_LOG_DIR").filter(|dir| !dir.is_empty());

        Ok(settings)
    }
}
