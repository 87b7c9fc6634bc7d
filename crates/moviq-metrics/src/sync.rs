//! Pairwise synchronization analysis for arbitrary signal pairs.
//!
//! Generalizes the phase and cross-correlation machinery beyond
//! left/right pairs: any two comparable series (two limbs, two
//! participants, two sensors) can be scored for phase locking and
//! best-aligning lag, either over the whole overlap or as a time-varying
//! sweep of overlapping windows.
//!
//! The computation pipeline per window mirrors the whole-signal path:
//! optional band-pass isolation, mean removal, analytic-signal phase
//! extraction, PLV, plus a normalized lagged cross-correlation peak.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use moviq_core::spectral::{instantaneous_phase, peak_cross_correlation, LagCorrelation};
use moviq_core::stats::center;
use moviq_core::{BandpassFilter, Error, Result};

use crate::report::MetricSet;

/// Fewest samples for meaningful phase extraction in a window
pub const MIN_SYNC_SAMPLES: usize = 8;

/// Synchronization analyzer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Optional band isolation `(low_hz, high_hz, rate_hz)` applied before
    /// phase extraction
    pub band: Option<(f64, f64, f64)>,
    /// PLV above this threshold classifies as in-phase
    pub phase_threshold: f64,
    /// Cross-correlation search range; defaults to 25% of the overlap
    pub max_lag: Option<usize>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            band: None,
            phase_threshold: 0.7,
            max_lag: None,
        }
    }
}

/// Windowed-sweep configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowedConfig {
    /// Samples per window
    pub window_size: usize,
    /// Fraction of each window shared with the next, in [0, 1)
    pub overlap: f64,
}

/// Phase relationship classification against the configured threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    InPhase,
    OutOfPhase,
}

/// Whole-signal synchronization result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncMetrics {
    /// Phase locking value in [0, 1]
    pub plv: f64,
    /// Best-aligning lag in samples
    pub lag: f64,
    /// Cross-correlation at that lag
    pub lag_correlation: f64,
}

impl MetricSet for SyncMetrics {
    fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("plv", self.plv),
            ("lag", self.lag),
            ("lag_correlation", self.lag_correlation),
        ]
    }
}

/// One step of the windowed sweep
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowedSample {
    /// First sample index of the window
    pub start: usize,
    pub plv: f64,
    pub lag: f64,
    pub lag_correlation: f64,
}

/// Pairwise synchronization analyzer
#[derive(Debug)]
pub struct SynchronizationAnalyzer {
    config: SyncConfig,
}

impl SynchronizationAnalyzer {
    /// Create an analyzer, validating threshold, lag, and band.
    pub fn new(config: SyncConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.phase_threshold) {
            return Err(Error::Config(format!(
                "phase threshold must lie in [0, 1], got {}",
                config.phase_threshold
            )));
        }
        if config.max_lag == Some(0) {
            return Err(Error::InvalidLag(0));
        }
        if let Some((low, high, rate)) = config.band {
            BandpassFilter::new(low, high, rate)?;
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Phase locking value over the common length of two signals.
    pub fn phase_locking(&self, x: &[f64], y: &[f64]) -> f64 {
        let n = x.len().min(y.len());
        if n < MIN_SYNC_SAMPLES {
            return f64::NAN;
        }

        let (x, y) = self.conditioned(&x[..n], &y[..n]);

        let px = instantaneous_phase(&x);
        let py = instantaneous_phase(&y);

        let sum: Complex<f64> = px
            .iter()
            .zip(py.iter())
            .map(|(a, b)| Complex::from_polar(1.0, a - b))
            .sum();

        (sum / n as f64).norm()
    }

    /// Classify a PLV against the configured threshold.
    ///
    /// Returns None for NaN input so undefined windows stay undefined.
    pub fn phase_status(&self, plv: f64) -> Option<PhaseStatus> {
        if plv.is_nan() {
            return None;
        }
        if plv > self.config.phase_threshold {
            Some(PhaseStatus::InPhase)
        } else {
            Some(PhaseStatus::OutOfPhase)
        }
    }

    /// Peak normalized cross-correlation over the common length.
    pub fn cross_correlation(&self, x: &[f64], y: &[f64]) -> LagCorrelation {
        let n = x.len().min(y.len());
        let max_lag = self.config.max_lag.unwrap_or_else(|| (n / 4).max(1));
        peak_cross_correlation(&x[..n], &y[..n], max_lag)
    }

    /// Whole-signal synchronization metrics.
    pub fn analyze(&self, x: &[f64], y: &[f64]) -> SyncMetrics {
        let plv = self.phase_locking(x, y);
        let peak = self.cross_correlation(x, y);

        SyncMetrics {
            plv,
            lag: if peak.value.is_nan() {
                f64::NAN
            } else {
                peak.lag as f64
            },
            lag_correlation: peak.value,
        }
    }

    /// Time-varying sweep of overlapping windows.
    ///
    /// Hop size is `floor(window_size * (1 - overlap))`, so the sweep
    /// yields exactly `floor((n - window_size) / hop) + 1` samples for
    /// signals of common length `n >= window_size`. The returned iterator
    /// is cheap to re-create from the same inputs, making the sweep
    /// restartable.
    pub fn windowed<'a>(
        &'a self,
        x: &'a [f64],
        y: &'a [f64],
        config: WindowedConfig,
    ) -> Result<WindowedSync<'a>> {
        if !(0.0..1.0).contains(&config.overlap) {
            return Err(Error::InvalidOverlap(config.overlap));
        }
        if config.window_size < MIN_SYNC_SAMPLES {
            return Err(Error::InvalidWindowSize {
                size: config.window_size,
                minimum: MIN_SYNC_SAMPLES,
            });
        }

        let hop = (config.window_size as f64 * (1.0 - config.overlap)).floor() as usize;
        if hop == 0 {
            // Overlap so high the sweep would never advance
            return Err(Error::InvalidOverlap(config.overlap));
        }

        let n = x.len().min(y.len());

        Ok(WindowedSync {
            analyzer: self,
            x: &x[..n],
            y: &y[..n],
            window_size: config.window_size,
            hop,
            next_start: 0,
        })
    }

    /// Band-pass (when configured) and center both series.
    fn conditioned(&self, x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (x, y) = match self.config.band {
            Some((low, high, rate)) => {
                let filtered_x = BandpassFilter::new(low, high, rate)
                    .map(|mut f| f.filter_signal(x))
                    .unwrap_or_else(|_| x.to_vec());
                let filtered_y = BandpassFilter::new(low, high, rate)
                    .map(|mut f| f.filter_signal(y))
                    .unwrap_or_else(|_| y.to_vec());
                (filtered_x, filtered_y)
            }
            None => (x.to_vec(), y.to_vec()),
        };

        (center(&x), center(&y))
    }
}

/// Restartable iterator over the windowed synchronization sweep
#[derive(Debug)]
pub struct WindowedSync<'a> {
    analyzer: &'a SynchronizationAnalyzer,
    x: &'a [f64],
    y: &'a [f64],
    window_size: usize,
    hop: usize,
    next_start: usize,
}

impl WindowedSync<'_> {
    /// Number of windows the sweep will yield in total.
    pub fn window_count(&self) -> usize {
        let n = self.x.len();
        if n < self.window_size {
            0
        } else {
            (n - self.window_size) / self.hop + 1
        }
    }
}

impl Iterator for WindowedSync<'_> {
    type Item = WindowedSample;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start;
        let end = start + self.window_size;
        if end > self.x.len() {
            return None;
        }

        self.next_start = start + self.hop;

        let metrics = self.analyzer.analyze(&self.x[start..end], &self.y[start..end]);

        Some(WindowedSample {
            start,
            plv: metrics.plv,
            lag: metrics.lag,
            lag_correlation: metrics.lag_correlation,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.x.len();
        let remaining = if self.next_start + self.window_size > n {
            0
        } else {
            (n - self.window_size - self.next_start) / self.hop + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WindowedSync<'_> {}
