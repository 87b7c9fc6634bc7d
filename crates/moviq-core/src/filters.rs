//! Digital pre-filters for kinematic signal conditioning.
//!
//! Two filters cover the analyzers' needs: Savitzky-Golay smoothing ahead
//! of spectral smoothness metrics, and Butterworth band isolation ahead of
//! Hilbert phase extraction (narrowband input keeps instantaneous phase
//! meaningful).

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Butterworth low-pass filter
#[derive(Debug)]
pub struct ButterworthFilter {
    a: Vec<f64>,
    b: Vec<f64>,
    x_history: VecDeque<f64>,
    y_history: VecDeque<f64>,
}

impl ButterworthFilter {
    /// Create a new Butterworth low-pass filter
    ///
    /// # Arguments
    /// * `order` - Filter order (1 or 2)
    /// * `cutoff_freq` - Cutoff frequency in Hz
    /// * `sample_rate` - Sampling rate in Hz
    pub fn new(order: usize, cutoff_freq: f64, sample_rate: f64) -> Result<Self> {
        if cutoff_freq <= 0.0 || cutoff_freq >= sample_rate / 2.0 {
            return Err(Error::Config(format!(
                "cutoff {cutoff_freq} Hz outside (0, {}) Hz",
                sample_rate / 2.0
            )));
        }

        let cutoff_normalized = cutoff_freq / (sample_rate / 2.0);

        // Pre-warp the cutoff frequency for the bilinear transform
        let omega = (std::f64::consts::PI * cutoff_normalized / 2.0).tan();

        let (a, b) = match order {
            1 => Self::coefficients_order1(omega),
            2 => Self::coefficients_order2(omega),
            _ => {
                return Err(Error::Config(format!(
                    "unsupported Butterworth order {order}, expected 1 or 2"
                )))
            }
        };

        let history_len = a.len();

        Ok(Self {
            a,
            b,
            x_history: VecDeque::from(vec![0.0; history_len]),
            y_history: VecDeque::from(vec![0.0; history_len]),
        })
    }

    fn coefficients_order1(omega: f64) -> (Vec<f64>, Vec<f64>) {
        let k = omega / (1.0 + omega);
        let a = vec![1.0, -(1.0 - omega) / (1.0 + omega)];
        let b = vec![k, k];
        (a, b)
    }

    fn coefficients_order2(omega: f64) -> (Vec<f64>, Vec<f64>) {
        let omega_sq = omega * omega;
        let sqrt2 = std::f64::consts::SQRT_2;

        let denom = 1.0 + sqrt2 * omega + omega_sq;

        let a = vec![
            1.0,
            2.0 * (omega_sq - 1.0) / denom,
            (1.0 - sqrt2 * omega + omega_sq) / denom,
        ];

        let k = omega_sq / denom;
        let b = vec![k, 2.0 * k, k];

        (a, b)
    }

    /// Process a single sample through the filter
    pub fn filter(&mut self, x: f64) -> f64 {
        self.x_history.push_front(x);
        self.x_history.pop_back();

        // Difference equation: feed-forward minus feedback
        let mut y = 0.0;

        for (i, &coef) in self.b.iter().enumerate() {
            if i < self.x_history.len() {
                y += coef * self.x_history[i];
            }
        }

        for (i, &coef) in self.a.iter().enumerate().skip(1) {
            if i - 1 < self.y_history.len() {
                y -= coef * self.y_history[i - 1];
            }
        }

        self.y_history.push_front(y);
        self.y_history.pop_back();

        y
    }

    /// Filter an entire signal causally (state reset first)
    pub fn filter_signal(&mut self, signal: &[f64]) -> Vec<f64> {
        self.reset();
        signal.iter().map(|&x| self.filter(x)).collect()
    }

    /// Forward-backward filtering for zero phase distortion
    ///
    /// Phase analyses need this variant: a causal pass alone would shift
    /// instantaneous phase by the filter's group delay.
    pub fn filter_zero_phase(&mut self, signal: &[f64]) -> Vec<f64> {
        let forward = self.filter_signal(signal);

        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        reversed = self.filter_signal(&reversed);
        reversed.reverse();
        reversed
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.x_history.iter_mut().for_each(|x| *x = 0.0);
        self.y_history.iter_mut().for_each(|y| *y = 0.0);
    }
}

/// Band-pass filter built as the difference of two low-pass sections
#[derive(Debug)]
pub struct BandpassFilter {
    lowpass_high: ButterworthFilter,
    lowpass_low: ButterworthFilter,
}

impl BandpassFilter {
    /// Create a band-pass filter keeping `[low_hz, high_hz]`.
    ///
    /// Band edges must satisfy 0 < low < high < rate/2.
    pub fn new(low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<Self> {
        if low_hz <= 0.0 || high_hz <= low_hz || high_hz >= sample_rate / 2.0 {
            return Err(Error::FilterBand {
                low_hz,
                high_hz,
                rate_hz: sample_rate,
            });
        }

        Ok(Self {
            lowpass_high: ButterworthFilter::new(2, high_hz, sample_rate)?,
            lowpass_low: ButterworthFilter::new(2, low_hz, sample_rate)?,
        })
    }

    /// Zero-phase band-pass of an entire signal.
    pub fn filter_signal(&mut self, signal: &[f64]) -> Vec<f64> {
        let wide = self.lowpass_high.filter_zero_phase(signal);
        let narrow = self.lowpass_low.filter_zero_phase(signal);

        wide.iter().zip(narrow.iter()).map(|(w, n)| w - n).collect()
    }
}

/// Savitzky-Golay filter for smoothing while preserving peaks
#[derive(Debug)]
pub struct SavitzkyGolayFilter {
    window_size: usize,
    coefficients: Vec<f64>,
}

impl SavitzkyGolayFilter {
    /// Create new Savitzky-Golay filter
    ///
    /// # Arguments
    /// * `window_size` - Must be odd and > poly_order
    /// * `poly_order` - Polynomial order (typically 2 or 3)
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        if window_size % 2 == 0 {
            return Err(Error::Config(format!(
                "Savitzky-Golay window must be odd, got {window_size}"
            )));
        }
        if window_size <= poly_order {
            return Err(Error::Config(format!(
                "Savitzky-Golay window {window_size} must exceed polynomial order {poly_order}"
            )));
        }

        let coefficients = Self::coefficients(window_size, poly_order);

        Ok(Self {
            window_size,
            coefficients,
        })
    }

    /// Convolution coefficients for the supported window/order pairs
    fn coefficients(window_size: usize, poly_order: usize) -> Vec<f64> {
        match (window_size, poly_order) {
            (5, 2) => vec![-3.0, 12.0, 17.0, 12.0, -3.0]
                .into_iter()
                .map(|x| x / 35.0)
                .collect(),
            (7, 2) => vec![-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0]
                .into_iter()
                .map(|x| x / 21.0)
                .collect(),
            (9, 2) => vec![-21.0, 14.0, 39.0, 54.0, 59.0, 54.0, 39.0, 14.0, -21.0]
                .into_iter()
                .map(|x| x / 231.0)
                .collect(),
            (7, 3) => vec![5.0, -6.0, -3.0, 4.0, -3.0, -6.0, 5.0]
                .into_iter()
                .map(|x| x / (-7.0))
                .collect(),
            _ => {
                // Uniform weights degrade to a moving average
                vec![1.0 / window_size as f64; window_size]
            }
        }
    }

    /// Filter a signal using Savitzky-Golay smoothing
    ///
    /// Signals shorter than the window pass through unchanged; boundary
    /// samples are copied rather than extrapolated.
    pub fn filter_signal(&self, signal: &[f64]) -> Vec<f64> {
        if signal.len() < self.window_size {
            return signal.to_vec();
        }

        let half = self.window_size / 2;
        let mut result = Vec::with_capacity(signal.len());

        for i in 0..half {
            result.push(signal[i]);
        }

        for i in half..(signal.len() - half) {
            let mut sum = 0.0;
            for (j, &coef) in self.coefficients.iter().enumerate() {
                sum += coef * signal[i + j - half];
            }
            result.push(sum);
        }

        for i in (signal.len() - half)..signal.len() {
            result.push(signal[i]);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_butterworth_dc() {
        let mut filter = ButterworthFilter::new(2, 10.0, 100.0).unwrap();

        // DC signal should pass through (approximately)
        let dc_signal = vec![1.0; 100];
        let filtered = filter.filter_signal(&dc_signal);

        let last_10_avg: f64 = filtered[90..].iter().sum::<f64>() / 10.0;
        assert!((last_10_avg - 1.0).abs() < 0.05, "DC should pass through");
    }

    #[test]
    fn test_butterworth_rejects_bad_cutoff() {
        assert!(ButterworthFilter::new(2, 60.0, 100.0).is_err());
        assert!(ButterworthFilter::new(3, 10.0, 100.0).is_err());
    }

    #[test]
    fn test_bandpass_rejects_inverted_band() {
        let err = BandpassFilter::new(10.0, 2.0, 100.0).unwrap_err();
        assert!(matches!(err, Error::FilterBand { .. }));
    }

    #[test]
    fn test_bandpass_attenuates_dc() {
        let mut filter = BandpassFilter::new(2.0, 10.0, 100.0).unwrap();

        let dc_signal = vec![1.0; 200];
        let filtered = filter.filter_signal(&dc_signal);

        let tail_avg: f64 = filtered[150..].iter().map(|v| v.abs()).sum::<f64>() / 50.0;
        assert!(tail_avg < 0.2, "DC should be rejected by the band-pass");
    }

    #[test]
    fn test_savitzky_golay_reduces_noise() {
        let filter = SavitzkyGolayFilter::new(5, 2).unwrap();

        let signal: Vec<f64> = (0..20)
            .map(|i| (i as f64) + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();

        let filtered = filter.filter_signal(&signal);

        let var_original: f64 = signal.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
        let var_filtered: f64 = filtered.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();

        assert!(var_filtered < var_original, "SG filter should reduce noise");
    }

    #[test]
    fn test_savitzky_golay_short_signal_passthrough() {
        let filter = SavitzkyGolayFilter::new(5, 2).unwrap();
        let short = vec![1.0, 2.0, 3.0];
        assert_eq!(filter.filter_signal(&short), short);
    }

    #[test]
    fn test_savitzky_golay_rejects_even_window() {
        assert!(SavitzkyGolayFilter::new(6, 2).is_err());
        assert!(SavitzkyGolayFilter::new(3, 3).is_err());
    }
}
