//! FFT-backed signal transforms shared by the frequency-domain analyzers.
//!
//! Three primitives cover the analyzers' needs:
//!
//! 1. Magnitude spectrum over positive frequencies (spectral arc length).
//! 2. Analytic signal via the FFT Hilbert method, from which
//!    instantaneous phase is the complex argument.
//! 3. Normalized lagged cross-correlation between two series.
//!
//! All transforms go through `rustfft` plans; no DFT is hand-rolled.

use num_complex::Complex;
use rustfft::FftPlanner;

use crate::stats::{mean, population_std};

/// Magnitude of the DFT over positive frequencies.
///
/// Returns `(frequencies_hz, magnitudes)` for the first `n/2` bins,
/// frequency bin spacing `rate_hz / n`.
pub fn magnitude_spectrum(signal: &[f64], rate_hz: f64) -> (Vec<f64>, Vec<f64>) {
    let n = signal.len();
    if n < 2 {
        return (Vec::new(), Vec::new());
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let half = n / 2;
    let freq_step = rate_hz / n as f64;

    let frequencies = (0..half).map(|i| i as f64 * freq_step).collect();
    let magnitudes = buffer[..half].iter().map(|c| c.norm()).collect();

    (frequencies, magnitudes)
}

/// Analytic signal computed with the FFT Hilbert method.
///
/// Positive-frequency bins are doubled, negative bins zeroed, then the
/// inverse transform yields a complex series whose imaginary part is the
/// Hilbert transform of the input.
pub fn analytic_signal(signal: &[f64]) -> Vec<Complex<f64>> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    // Keep DC (and Nyquist for even n) at unit weight, double the rest of
    // the positive half, zero the negative half.
    let half = n / 2;
    for (i, value) in buffer.iter_mut().enumerate() {
        if i == 0 || (n % 2 == 0 && i == half) {
            continue;
        } else if i < half || (n % 2 == 1 && i == half) {
            *value *= 2.0;
        } else {
            *value = Complex::new(0.0, 0.0);
        }
    }

    ifft.process(&mut buffer);

    // rustfft leaves the inverse unscaled
    let scale = 1.0 / n as f64;
    buffer.iter_mut().for_each(|c| *c *= scale);

    buffer
}

/// Instantaneous phase of a series, in radians.
pub fn instantaneous_phase(signal: &[f64]) -> Vec<f64> {
    analytic_signal(signal).iter().map(|c| c.arg()).collect()
}

/// Correlation of two series at a single lag.
#[derive(Debug, Clone, Copy)]
pub struct LagCorrelation {
    /// Lag in samples; positive means `y` trails `x`.
    pub lag: isize,
    /// Normalized correlation at that lag.
    pub value: f64,
}

/// Normalized cross-correlation over lags in `[-max_lag, max_lag]`.
///
/// Both series are mean-removed; each lag's sum runs over the overlapping
/// region and is normalized by the overlap length and the population
/// standard deviations, so a shifted copy of a signal correlates at 1.0
/// at the recovering lag. Zero-variance input yields NaN at every lag.
pub fn normalized_cross_correlation(x: &[f64], y: &[f64], max_lag: usize) -> Vec<LagCorrelation> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Vec::new();
    }

    let max_lag = max_lag.min(n - 1) as isize;

    let x_mean = mean(&x[..n]);
    let y_mean = mean(&y[..n]);
    let x_std = population_std(&x[..n]);
    let y_std = population_std(&y[..n]);
    let denom = x_std * y_std;

    (-max_lag..=max_lag)
        .map(|lag| {
            if denom == 0.0 {
                return LagCorrelation {
                    lag,
                    value: f64::NAN,
                };
            }

            let (x_start, y_start) = if lag >= 0 {
                (0usize, lag as usize)
            } else {
                ((-lag) as usize, 0usize)
            };
            let overlap = n - lag.unsigned_abs();

            let mut sum = 0.0;
            for t in 0..overlap {
                sum += (x[x_start + t] - x_mean) * (y[y_start + t] - y_mean);
            }

            LagCorrelation {
                lag,
                value: sum / (overlap as f64 * denom),
            }
        })
        .collect()
}

/// Lag maximizing the normalized cross-correlation.
///
/// Returns a NaN-valued zero lag when no finite correlation exists.
pub fn peak_cross_correlation(x: &[f64], y: &[f64], max_lag: usize) -> LagCorrelation {
    normalized_cross_correlation(x, y, max_lag)
        .into_iter()
        .filter(|c| c.value.is_finite())
        .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap())
        .unwrap_or(LagCorrelation {
            lag: 0,
            value: f64::NAN,
        })
}
