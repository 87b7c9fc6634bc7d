//! Movement smoothness metrics - SPARC and jerk RMS.
//!
//! ## SPARC (Spectral Arc Length)
//!
//! The cumulative Euclidean arc length of the curve (frequency,
//! normalized magnitude) over positive frequencies, negated. The spectrum
//! here is the raw FFT magnitude normalized by its maximum (not a Welch
//! PSD; the two are sometimes conflated in the literature and are
//! numerically different).
//!
//! Interpretation guidance from the movement-science literature, not an
//! enforced range: more negative values are read as smoother motion,
//! values above -1.5 as jerky, and values below -6.0 as a sign the signal
//! was over-smoothed upstream.
//!
//! ## Jerk RMS
//!
//! Root mean square of a single finite-difference derivative scaled by
//! the sampling rate. Exactly one differentiation is performed: feed
//! acceleration to obtain jerk RMS; feeding position yields velocity RMS
//! instead. Lower values indicate smoother movement.

use serde::{Deserialize, Serialize};

use moviq_core::spectral::magnitude_spectrum;
use moviq_core::stats::{normalize_by_max, variance};
use moviq_core::{Error, Result, SavitzkyGolayFilter, SlidingWindow};

use crate::report::MetricSet;

/// Fewest samples for a non-degenerate spectral arc length
pub const MIN_SPARC_SAMPLES: usize = 5;

/// Fewest samples for one finite difference
pub const MIN_JERK_SAMPLES: usize = 2;

/// Smoothness analyzer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothnessConfig {
    /// Sampling rate of the signal in Hz
    pub rate_hz: f64,
    /// Apply Savitzky-Golay filtering before analysis
    pub use_filter: bool,
}

impl Default for SmoothnessConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            use_filter: true,
        }
    }
}

/// Smoothness metric result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothnessMetrics {
    /// Spectral arc length (negative)
    pub sparc: f64,
    /// RMS of the once-differentiated signal
    pub jerk_rms: f64,
}

impl MetricSet for SmoothnessMetrics {
    fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![("sparc", self.sparc), ("jerk_rms", self.jerk_rms)]
    }
}

/// Movement smoothness analyzer
#[derive(Debug)]
pub struct SmoothnessAnalyzer {
    config: SmoothnessConfig,
    savgol: Option<SavitzkyGolayFilter>,
}

impl SmoothnessAnalyzer {
    /// Create an analyzer, validating the sampling rate up front.
    pub fn new(config: SmoothnessConfig) -> Result<Self> {
        if !(0.01..=100_000.0).contains(&config.rate_hz) {
            return Err(Error::InvalidRate(config.rate_hz));
        }

        let savgol = if config.use_filter {
            Some(SavitzkyGolayFilter::new(5, 2)?)
        } else {
            None
        };

        Ok(Self { config, savgol })
    }

    pub fn config(&self) -> &SmoothnessConfig {
        &self.config
    }

    /// Compute both smoothness metrics from a raw signal.
    ///
    /// Each metric NaN-guards independently: jerk RMS needs two samples,
    /// SPARC needs five and non-zero variance.
    pub fn analyze(&self, signal: &[f64]) -> SmoothnessMetrics {
        let filtered = match &self.savgol {
            Some(filter) => filter.filter_signal(signal),
            None => signal.to_vec(),
        };

        SmoothnessMetrics {
            sparc: self.sparc(&filtered),
            jerk_rms: self.jerk_rms(&filtered),
        }
    }

    /// Compute smoothness from the first channel of a window.
    pub fn analyze_window(&self, window: &SlidingWindow) -> SmoothnessMetrics {
        let signal = window.column(0).unwrap_or_default();
        self.analyze(&signal)
    }

    /// Spectral arc length of an already-filtered signal.
    fn sparc(&self, signal: &[f64]) -> f64 {
        if signal.len() < MIN_SPARC_SAMPLES {
            return f64::NAN;
        }
        if variance(signal) == 0.0 {
            // Constant input has no spectral shape to measure
            return f64::NAN;
        }

        let normalized = normalize_by_max(signal);
        let (frequencies, magnitudes) = magnitude_spectrum(&normalized, self.config.rate_hz);

        let peak = magnitudes.iter().cloned().fold(0.0, f64::max);
        if peak == 0.0 {
            return f64::NAN;
        }

        let scaled: Vec<f64> = magnitudes.iter().map(|m| m / peak).collect();

        let mut arc_length = 0.0;
        for i in 1..scaled.len() {
            let df = frequencies[i] - frequencies[i - 1];
            let dm = scaled[i] - scaled[i - 1];
            arc_length += (df * df + dm * dm).sqrt();
        }

        -arc_length
    }

    /// RMS of one finite-difference derivative.
    fn jerk_rms(&self, signal: &[f64]) -> f64 {
        if signal.len() < MIN_JERK_SAMPLES {
            return f64::NAN;
        }

        let sum_sq: f64 = signal
            .windows(2)
            .map(|w| {
                let derivative = (w[1] - w[0]) * self.config.rate_hz;
                derivative * derivative
            })
            .sum();

        (sum_sq / (signal.len() - 1) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn analyzer(use_filter: bool) -> SmoothnessAnalyzer {
        SmoothnessAnalyzer::new(SmoothnessConfig {
            rate_hz: 100.0,
            use_filter,
        })
        .unwrap()
    }

    fn sine(freq: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin())
            .collect()
    }

    #[test]
    fn test_rejects_bad_rate() {
        let err = SmoothnessAnalyzer::new(SmoothnessConfig {
            rate_hz: 0.0,
            use_filter: false,
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRate(_)));
    }

    #[test]
    fn test_constant_velocity_has_zero_jerk_rms() {
        let analyzer = analyzer(false);

        // Constant signal: every finite difference is exactly zero
        let constant = vec![3.5; 50];
        let result = analyzer.analyze(&constant);

        assert_eq!(result.jerk_rms, 0.0);
    }

    #[test]
    fn test_constant_signal_sparc_is_nan() {
        let analyzer = analyzer(false);
        let result = analyzer.analyze(&vec![1.0; 64]);
        assert!(result.sparc.is_nan());
    }

    #[test]
    fn test_short_signal_is_nan() {
        let analyzer = analyzer(false);

        let result = analyzer.analyze(&[1.0, 2.0, 3.0]);
        assert!(result.sparc.is_nan(), "SPARC needs five samples");
        assert!(result.jerk_rms.is_finite(), "jerk needs only two");

        let result = analyzer.analyze(&[1.0]);
        assert!(result.jerk_rms.is_nan());
    }

    #[test]
    fn test_noise_lengthens_the_spectral_arc() {
        let analyzer = analyzer(false);
        let rate = 100.0;
        let n = 200;

        let smooth = sine(1.0, rate, n);
        let noisy: Vec<f64> = smooth
            .iter()
            .enumerate()
            .map(|(i, v)| v + 0.4 * ((i as f64 * 12.9898).sin() * 43758.5453).fract())
            .collect();

        let smooth_result = analyzer.analyze(&smooth);
        let noisy_result = analyzer.analyze(&noisy);

        // Broadband noise spreads spectral content across the axis,
        // lengthening the arc
        assert!(
            noisy_result.sparc < smooth_result.sparc,
            "smooth {} vs noisy {}",
            smooth_result.sparc,
            noisy_result.sparc
        );
        assert!(smooth_result.jerk_rms < noisy_result.jerk_rms);
    }

    #[test]
    fn test_filtering_smooths_the_estimate() {
        let rate = 100.0;
        let n = 200;
        let noisy: Vec<f64> = sine(1.0, rate, n)
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let unfiltered = analyzer(false).analyze(&noisy);
        let filtered = analyzer(true).analyze(&noisy);

        assert!(filtered.jerk_rms < unfiltered.jerk_rms);
    }

    #[test]
    fn test_window_analysis_uses_first_channel() {
        let analyzer = analyzer(false);

        let mut window = SlidingWindow::new(64, 2).unwrap();
        for i in 0..64 {
            window.append(&[i as f64, 0.0]).unwrap();
        }

        let result = analyzer.analyze_window(&window);
        // Linear ramp: constant derivative, so RMS equals the slope * rate
        assert!((result.jerk_rms - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_stable_key_set() {
        let result = analyzer(false).analyze(&[]);
        let map = result.to_map();
        assert!(map.contains_key("sparc"));
        assert!(map.contains_key("jerk_rms"));
    }
}
