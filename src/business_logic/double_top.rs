use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::business_logic::config::DetectorConfig;
use crate::business_logic::peaks::find_peaks;
use crate::errors::DetectionError;
use crate::models::series::PriceSeries;

/// A double top found in a price series.
///
/// Breakdown fields are only present when the neckline was broken inside the
/// lookahead window; an unconfirmed pattern is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatternCandidate {
    pub first_peak_index: usize,
    pub second_peak_index: usize,
    pub trough_index: usize,
    #[schema(value_type = String)]
    pub first_peak_date: DateTime<Utc>,
    #[schema(value_type = String)]
    pub second_peak_date: DateTime<Utc>,
    #[schema(value_type = String)]
    pub trough_date: DateTime<Utc>,
    pub first_peak_price: f64,
    pub second_peak_price: f64,
    pub trough_price: f64,
    /// |p1 - p2| / max(p1, p2)
    pub relative_peak_difference: f64,
    pub breakdown_index: Option<usize>,
    #[schema(value_type = Option<String>)]
    pub breakdown_date: Option<DateTime<Utc>>,
    pub confirmed: bool,
}

/// Scan a series for double tops.
///
/// Every pair of peaks is considered, ordered by first peak then second peak,
/// so the output is deterministic for a given series and config. Series
/// shorter than `2 * window + 1` return an empty vec.
pub fn detect_double_tops(
    series: &PriceSeries,
    config: &DetectorConfig,
) -> Result<Vec<PatternCandidate>, DetectionError> {
    config.validate()?;

    let prices = series.closes();
    let peaks = find_peaks(prices, config.window);
    tracing::debug!("{} peaks in {} bars", peaks.len(), prices.len());

    let mut patterns = Vec::new();
    for (i, &p1) in peaks.iter().enumerate() {
        for &p2 in &peaks[i + 1..] {
            let separation = p2 - p1;
            if separation < config.min_separation || separation > config.max_separation {
                continue;
            }

            let trough = lowest_index(prices, p1, p2);
            let (p1_price, p2_price, trough_price) = (prices[p1], prices[p2], prices[trough]);

            let relative_peak_difference = (p1_price - p2_price).abs() / p1_price.max(p2_price);
            if relative_peak_difference > config.tolerance {
                continue;
            }

            if !(trough_price < p1_price && trough_price < p2_price) {
                continue;
            }

            let breakdown_index = find_breakdown(prices, p2, trough_price, config);

            tracing::debug!(
                "Double top {} -> {} (trough {} at {:.4}, diff {:.4}, breakdown {:?})",
                p1,
                p2,
                trough,
                trough_price,
                relative_peak_difference,
                breakdown_index
            );

            patterns.push(PatternCandidate {
                first_peak_index: p1,
                second_peak_index: p2,
                trough_index: trough,
                first_peak_date: series.timestamp(p1),
                second_peak_date: series.timestamp(p2),
                trough_date: series.timestamp(trough),
                first_peak_price: p1_price,
                second_peak_price: p2_price,
                trough_price,
                relative_peak_difference,
                breakdown_index,
                breakdown_date: breakdown_index.map(|idx| series.timestamp(idx)),
                confirmed: breakdown_index.is_some(),
            });
        }
    }

    Ok(patterns)
}

/// Neckline break level for a trough
pub fn breakdown_threshold(trough_price: f64, min_drop: f64) -> f64 {
    trough_price * (1.0 - min_drop)
}

/// First index of the minimum in `prices[start..=end]`
fn lowest_index(prices: &[f64], start: usize, end: usize) -> usize {
    let mut lowest = start;
    for idx in start + 1..=end {
        if prices[idx] < prices[lowest] {
            lowest = idx;
        }
    }
    lowest
}

/// First bar after the second peak, within the lookahead, that closes at or below the break level
fn find_breakdown(
    prices: &[f64],
    second_peak: usize,
    trough_price: f64,
    config: &DetectorConfig,
) -> Option<usize> {
    let threshold = breakdown_threshold(trough_price, config.min_drop);
    let end = prices
        .len()
        .min(second_peak.saturating_add(config.lookahead).saturating_add(1));

    (second_peak + 1..end).find(|&idx| prices[idx] <= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::test_support::daily_series;

    /// Piecewise-linear closes through `(index, price)` anchors
    fn path(anchors: &[(usize, f64)]) -> Vec<f64> {
        let len = anchors.last().map(|(idx, _)| idx + 1).unwrap_or(0);
        let mut prices = vec![0.0; len];
        for pair in anchors.windows(2) {
            let (start, from) = pair[0];
            let (end, to) = pair[1];
            for idx in start..=end {
                let t = (idx - start) as f64 / (end - start) as f64;
                prices[idx] = from + (to - from) * t;
            }
        }
        prices
    }

    /// Deterministic noisy wave with many peaks
    fn noisy_wave(len: usize) -> Vec<f64> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        (0..len)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let noise = (state % 1000) as f64 / 1000.0 - 0.5;
                let x = i as f64;
                100.0 + 8.0 * (x / 9.0).sin() + 3.0 * (x / 23.0).cos() + noise
            })
            .collect()
    }

    fn loose_config() -> DetectorConfig {
        DetectorConfig {
            window: 3,
            min_separation: 4,
            max_separation: 60,
            tolerance: 0.03,
            min_drop: 0.01,
            lookahead: 20,
        }
    }

    #[test]
    fn flat_series_has_no_candidates() {
        let series = daily_series(&[10.0; 30]);
        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert!(result.is_empty());

        let series = daily_series(&[10.0; 200]);
        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn confirmed_double_top() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);

        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert_eq!(result.len(), 1);

        let pattern = &result[0];
        assert_eq!(pattern.first_peak_index, 20);
        assert_eq!(pattern.second_peak_index, 50);
        assert_eq!(pattern.trough_index, 35);
        assert_eq!(pattern.trough_price, 90.0);
        assert_eq!(pattern.relative_peak_difference, 0.0);
        assert!(pattern.confirmed);
        // 90 * 0.97 = 87.3 is first reached at index 59 (86.5)
        assert_eq!(pattern.breakdown_index, Some(59));
        assert_eq!(pattern.breakdown_date, Some(series.timestamp(59)));
        assert_eq!(pattern.first_peak_date, series.timestamp(20));
        assert_eq!(pattern.second_peak_date, series.timestamp(50));
        assert_eq!(pattern.trough_date, series.timestamp(35));
    }

    #[test]
    fn unconfirmed_double_top() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 88.0), (80, 88.0)]);
        let series = daily_series(&prices);

        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert_eq!(result.len(), 1);

        let pattern = &result[0];
        assert!(!pattern.confirmed);
        assert!(pattern.breakdown_index.is_none());
        assert!(pattern.breakdown_date.is_none());
    }

    #[test]
    fn breakdown_outside_lookahead_is_unconfirmed() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);
        let config = DetectorConfig {
            lookahead: 8,
            ..DetectorConfig::default()
        };

        let result = detect_double_tops(&series, &config).unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].confirmed);

        let config = DetectorConfig {
            lookahead: 9,
            ..DetectorConfig::default()
        };
        let result = detect_double_tops(&series, &config).unwrap();
        assert_eq!(result[0].breakdown_index, Some(59));
    }

    #[test]
    fn separation_bounds_are_inclusive() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);

        let exact = DetectorConfig {
            min_separation: 30,
            max_separation: 30,
            ..DetectorConfig::default()
        };
        assert_eq!(detect_double_tops(&series, &exact).unwrap().len(), 1);

        let too_far = DetectorConfig {
            max_separation: 29,
            ..DetectorConfig::default()
        };
        assert!(detect_double_tops(&series, &too_far).unwrap().is_empty());

        let too_close = DetectorConfig {
            min_separation: 31,
            max_separation: 90,
            ..DetectorConfig::default()
        };
        assert!(detect_double_tops(&series, &too_close).unwrap().is_empty());
    }

    #[test]
    fn tolerance_is_inclusive() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 99.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);

        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].relative_peak_difference, 0.01);

        let strict = DetectorConfig {
            tolerance: 0.009,
            ..DetectorConfig::default()
        };
        assert!(detect_double_tops(&series, &strict).unwrap().is_empty());
    }

    #[test]
    fn non_adjacent_peaks_are_paired() {
        // a lower middle peak at 20 sits between two equal tops
        let prices = path(&[
            (0, 80.0),
            (10, 100.0),
            (15, 90.0),
            (20, 95.0),
            (25, 88.0),
            (30, 100.0),
            (40, 80.0),
        ]);
        let series = daily_series(&prices);
        let config = DetectorConfig {
            window: 3,
            ..DetectorConfig::default()
        };

        let result = detect_double_tops(&series, &config).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].first_peak_index, 10);
        assert_eq!(result[0].second_peak_index, 30);
        assert_eq!(result[0].trough_index, 25);
        assert_eq!(result[0].breakdown_index, Some(38));
    }

    #[test]
    fn short_series_is_empty_not_error() {
        let series = daily_series(&[1.0, 3.0, 2.0, 5.0, 1.0]);
        let result = detect_double_tops(&series, &DetectorConfig::default()).unwrap();
        assert!(result.is_empty());

        let empty = daily_series(&[]);
        assert!(detect_double_tops(&empty, &DetectorConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn huge_window_is_empty_not_panic() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);
        let config = DetectorConfig {
            window: usize::MAX / 2 + 1,
            ..DetectorConfig::default()
        };
        assert!(detect_double_tops(&series, &config).unwrap().is_empty());
    }

    #[test]
    fn huge_lookahead_clips_to_series_end() {
        let prices = path(&[(0, 80.0), (20, 100.0), (35, 90.0), (50, 100.0), (60, 85.0), (80, 85.0)]);
        let series = daily_series(&prices);
        let config = DetectorConfig {
            lookahead: usize::MAX,
            ..DetectorConfig::default()
        };
        let result = detect_double_tops(&series, &config).unwrap();
        assert_eq!(result[0].breakdown_index, Some(59));
    }

    #[test]
    fn invalid_config_fails_before_scan() {
        let series = daily_series(&[]);
        let config = DetectorConfig {
            window: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            detect_double_tops(&series, &config),
            Err(DetectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn candidate_invariants_hold_on_noisy_data() {
        let config = loose_config();
        let series = daily_series(&noisy_wave(600));
        let prices = series.closes();
        let result = detect_double_tops(&series, &config).unwrap();

        assert!(!result.is_empty());
        for pattern in &result {
            assert!(pattern.first_peak_index < pattern.trough_index);
            assert!(pattern.trough_index < pattern.second_peak_index);

            let separation = pattern.second_peak_index - pattern.first_peak_index;
            assert!(separation >= config.min_separation && separation <= config.max_separation);
            assert!(pattern.relative_peak_difference <= config.tolerance);
            assert!(pattern.trough_price < pattern.first_peak_price);
            assert!(pattern.trough_price < pattern.second_peak_price);

            let threshold = breakdown_threshold(pattern.trough_price, config.min_drop);
            let end = prices.len().min(pattern.second_peak_index + config.lookahead + 1);
            let first_break =
                (pattern.second_peak_index + 1..end).find(|&idx| prices[idx] <= threshold);

            assert_eq!(pattern.breakdown_index, first_break);
            assert_eq!(pattern.confirmed, first_break.is_some());
            if let Some(idx) = pattern.breakdown_index {
                assert!(prices[idx] <= threshold);
                assert_eq!(pattern.breakdown_date, Some(series.timestamp(idx)));
            }
        }
    }

    #[test]
    fn output_order_and_determinism() {
        let config = loose_config();
        let series = daily_series(&noisy_wave(600));

        let first = detect_double_tops(&series, &config).unwrap();
        let second = detect_double_tops(&series, &config).unwrap();
        assert_eq!(first, second);

        let keys: Vec<(usize, usize)> = first
            .iter()
            .map(|p| (p.first_peak_index, p.second_peak_index))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
