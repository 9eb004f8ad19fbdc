/// Indices of local maxima over a symmetric window of radius `window`.
///
/// `prices[i]` qualifies when it equals the max of `prices[i-window..=i+window]`
/// and is strictly above both immediate neighbours. Ties with other bars in the
/// window are allowed, so plateaus away from `i` do not suppress a peak.
/// Returns an empty vec when `prices.len() <= 2 * window`, including windows
/// too large for `2 * window` to fit in a `usize`.
pub fn find_peaks(prices: &[f64], window: usize) -> Vec<usize> {
    let n = prices.len();
    if window == 0 || n <= window || n - window <= window {
        return Vec::new();
    }

    let mut peaks = Vec::new();
    for i in window..n - window {
        let price = prices[i];
        if price <= prices[i - 1] || price <= prices[i + 1] {
            continue;
        }

        let window_max = prices[i - window..=i + window]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if price == window_max {
            peaks.push(i);
        }
    }

    peaks
}
