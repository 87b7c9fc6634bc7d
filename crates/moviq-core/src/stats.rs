//! Small statistics helpers shared by the analyzers.

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance, 0.0 below two samples.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Population standard deviation (divide by n).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Remove the mean, eliminating DC bias.
pub fn center(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    values.iter().map(|v| v - m).collect()
}

/// Scale by the maximum absolute value into [-1, 1].
///
/// A signal whose maximum magnitude is zero is returned unchanged.
pub fn normalize_by_max(values: &[f64]) -> Vec<f64> {
    let max_abs = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max_abs == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|v| v / max_abs).collect()
}
