//! Sample statistics shared by the estimators

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the n - 1 denominator
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Sort a copy of the sample ascending
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of an ascending sample with linear interpolation between order statistics
///
/// h = (n - 1) * p, result = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)]).
/// `sorted` must be non-empty and `p` in [0, 1].
pub fn linear_quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = h - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

/// Mean of the values at or below `threshold`, `None` when none qualify
pub fn tail_mean(sorted: &[f64], threshold: f64) -> Option<f64> {
    let tail_len = sorted.partition_point(|&v| v <= threshold);
    if tail_len == 0 {
        return None;
    }
    Some(mean(&sorted[..tail_len]))
}
