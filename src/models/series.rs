use chrono::{DateTime, Utc};

use crate::errors::DetectionError;
use crate::models::candle::Candle;

/// One close observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Time-ordered closes for a single instrument.
///
/// Timestamps are strictly increasing and every close is finite; both are
/// checked on construction so the detector can index freely.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, DetectionError> {
        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() {
                return Err(DetectionError::MalformedSeries {
                    index,
                    reason: format!("close price {} is not finite", point.close),
                });
            }
            if index > 0 && point.timestamp <= points[index - 1].timestamp {
                return Err(DetectionError::MalformedSeries {
                    index,
                    reason: format!(
                        "timestamp {} does not follow {}",
                        point.timestamp,
                        points[index - 1].timestamp
                    ),
                });
            }
        }

        let closes = points.iter().map(|p| p.close).collect();
        Ok(Self { points, closes })
    }

    /// Build a series from candle open times and closes
    pub fn from_candles(candles: &[Candle]) -> Result<Self, DetectionError> {
        let mut points = Vec::with_capacity(candles.len());
        for (index, candle) in candles.iter().enumerate() {
            let timestamp = i64::try_from(candle.open_time)
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| DetectionError::MalformedSeries {
                    index,
                    reason: format!("open time {} is out of range", candle.open_time),
                })?;
            points.push(PricePoint {
                timestamp,
                close: candle.close,
            });
        }
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn timestamp(&self, index: usize) -> DateTime<Utc> {
        self.points[index].timestamp
    }
}
