//! Bilateral symmetry analysis between paired left/right trajectories.
//!
//! Four complementary views of how alike two sides of the body move:
//!
//! - **CCA**: the first canonical correlation between the trajectories
//!   after column standardization - sensitive to any linear coupling,
//!   regardless of axis mixing.
//! - **PLV**: phase locking of the two scalar series - sensitive to
//!   timing consistency independent of amplitude.
//! - **CVS**: ratio of coefficients of variation - a purely statistical
//!   index of amplitude-variability symmetry.
//! - **Lagged cross-correlation**: the best-aligning delay between the
//!   sides and the correlation achieved there.
//!
//! The four metrics are independent; each NaN-guards on its own failure
//! mode and the result always carries all five keys.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use moviq_core::spectral::{instantaneous_phase, peak_cross_correlation};
use moviq_core::stats::{center, mean, population_std};
use moviq_core::{BandpassFilter, Error, Result};

use crate::report::MetricSet;

/// Documented minimum for a stable canonical correlation
pub const MIN_CCA_SAMPLES: usize = 20;

/// Fewest samples for meaningful instantaneous phase
pub const MIN_PHASE_SAMPLES: usize = 8;

/// Eigenvalue floor guarding the whitening inversion
const RIDGE: f64 = 1e-10;

/// Bilateral symmetry analyzer configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SymmetryConfig {
    /// Cross-correlation search range in samples; defaults to 25% of the
    /// common length when unset
    pub max_lag: Option<usize>,
    /// Optional band isolation `(low_hz, high_hz, rate_hz)` applied to the
    /// scalar series before phase extraction
    pub band: Option<(f64, f64, f64)>,
}

/// Bilateral symmetry metric result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymmetryMetrics {
    /// First canonical correlation in [0, 1]
    pub cca: f64,
    /// Phase locking value in [0, 1]
    pub plv: f64,
    /// Coefficient-of-variation symmetry in (0, 1]
    pub cvs: f64,
    /// Best-aligning lag in samples (positive: right trails left)
    pub lag: f64,
    /// Cross-correlation at that lag
    pub lag_correlation: f64,
}

impl MetricSet for SymmetryMetrics {
    fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("cca", self.cca),
            ("plv", self.plv),
            ("cvs", self.cvs),
            ("lag", self.lag),
            ("lag_correlation", self.lag_correlation),
        ]
    }
}

/// Bilateral symmetry analyzer over paired trajectories
#[derive(Debug)]
pub struct BilateralSymmetryAnalyzer {
    config: SymmetryConfig,
}

impl BilateralSymmetryAnalyzer {
    /// Create an analyzer, validating lag and band configuration.
    pub fn new(config: SymmetryConfig) -> Result<Self> {
        if config.max_lag == Some(0) {
            return Err(Error::InvalidLag(0));
        }
        if let Some((low, high, rate)) = config.band {
            // Constructing the filter performs the edge validation
            BandpassFilter::new(low, high, rate)?;
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &SymmetryConfig {
        &self.config
    }

    /// Compute all symmetry metrics for paired trajectories.
    ///
    /// Trajectories are `(samples, coordinates)` matrices; the shorter
    /// sample count bounds the comparison. The scalar series feeding the
    /// 1-D metrics is the single column for one-column input and the
    /// per-row Euclidean norm otherwise.
    pub fn analyze(&self, left: &Array2<f64>, right: &Array2<f64>) -> SymmetryMetrics {
        let n = left.nrows().min(right.nrows());

        let cca = canonical_correlation(left, right);

        let mut x = scalar_series(left, n);
        let mut y = scalar_series(right, n);

        if let Some((low, high, rate)) = self.config.band {
            if let Ok(mut filter) = BandpassFilter::new(low, high, rate) {
                x = filter.filter_signal(&x);
            }
            if let Ok(mut filter) = BandpassFilter::new(low, high, rate) {
                y = filter.filter_signal(&y);
            }
        }

        let plv = phase_locking_value(&x, &y);
        let cvs = cv_symmetry(&x, &y);

        let max_lag = self.config.max_lag.unwrap_or_else(|| (n / 4).max(1));
        let peak = peak_cross_correlation(&x, &y, max_lag);

        SymmetryMetrics {
            cca,
            plv,
            cvs,
            lag: if peak.value.is_nan() {
                f64::NAN
            } else {
                peak.lag as f64
            },
            lag_correlation: peak.value,
        }
    }

    /// Convenience for plain 1-D signal pairs.
    pub fn analyze_signals(&self, left: &[f64], right: &[f64]) -> SymmetryMetrics {
        let l = Array2::from_shape_vec((left.len(), 1), left.to_vec())
            .expect("shape follows from the slice length");
        let r = Array2::from_shape_vec((right.len(), 1), right.to_vec())
            .expect("shape follows from the slice length");
        self.analyze(&l, &r)
    }
}

/// First canonical correlation between two trajectories.
///
/// Columns are centered and scaled to unit variance, the cross-covariance
/// is whitened by the symmetric inverse square roots of the
/// auto-covariances, and the largest singular value of the whitened
/// matrix is reported, clamped to [0, 1]. NaN below [`MIN_CCA_SAMPLES`]
/// samples or when any column has zero variance.
pub fn canonical_correlation(left: &Array2<f64>, right: &Array2<f64>) -> f64 {
    let n = left.nrows().min(right.nrows());
    if n < MIN_CCA_SAMPLES {
        return f64::NAN;
    }

    let x = match standardized(left, n) {
        Some(m) => m,
        None => return f64::NAN,
    };
    let y = match standardized(right, n) {
        Some(m) => m,
        None => return f64::NAN,
    };

    let denom = (n - 1) as f64;
    let xt = x.transpose();
    let yt = y.transpose();

    let mut cxx = &xt * &x / denom;
    let mut cyy = &yt * &y / denom;
    let cxy = &xt * &y / denom;

    for i in 0..cxx.nrows() {
        cxx[(i, i)] += RIDGE;
    }
    for i in 0..cyy.nrows() {
        cyy[(i, i)] += RIDGE;
    }

    let wx = symmetric_inverse_sqrt(&cxx);
    let wy = symmetric_inverse_sqrt(&cyy);

    let whitened = &wx * &cxy * &wy;
    let svd = whitened.svd(false, false);

    let rho = svd
        .singular_values
        .iter()
        .cloned()
        .fold(0.0_f64, f64::max);

    rho.clamp(0.0, 1.0)
}

/// Phase locking value between two scalar series.
///
/// Both series are mean-centered, instantaneous phases extracted via the
/// analytic signal, and the mean unit phasor of the phase difference
/// reported. 1.0 means a perfectly constant phase relation.
pub fn phase_locking_value(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < MIN_PHASE_SAMPLES {
        return f64::NAN;
    }

    let cx = center(&x[..n]);
    let cy = center(&y[..n]);

    let px = instantaneous_phase(&cx);
    let py = instantaneous_phase(&cy);

    let sum: Complex<f64> = px
        .iter()
        .zip(py.iter())
        .map(|(a, b)| Complex::from_polar(1.0, a - b))
        .sum();

    (sum / n as f64).norm()
}

/// Coefficient-of-variation symmetry index.
///
/// `min(r, 1/r)` of the CV ratio, where CV = population std over the
/// magnitude of the mean. NaN when either mean is zero; two zero-variance
/// series count as trivially symmetric.
pub fn cv_symmetry(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || y.is_empty() {
        return f64::NAN;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    if mean_x == 0.0 || mean_y == 0.0 {
        return f64::NAN;
    }

    let cv_x = population_std(x) / mean_x.abs();
    let cv_y = population_std(y) / mean_y.abs();

    if cv_x == 0.0 && cv_y == 0.0 {
        return 1.0;
    }
    if cv_x == 0.0 || cv_y == 0.0 {
        return 0.0;
    }

    let ratio = cv_x / cv_y;
    ratio.min(1.0 / ratio)
}

/// Column-standardized matrix, or None on a zero-variance column.
fn standardized(trajectory: &Array2<f64>, rows: usize) -> Option<DMatrix<f64>> {
    let cols = trajectory.ncols();
    if cols == 0 {
        return None;
    }

    let mut means = vec![0.0; cols];
    let mut stds = vec![0.0; cols];

    for c in 0..cols {
        let column: Vec<f64> = (0..rows).map(|r| trajectory[[r, c]]).collect();
        let m = mean(&column);
        let s = population_std(&column);
        if s == 0.0 {
            return None;
        }
        means[c] = m;
        stds[c] = s;
    }

    Some(DMatrix::from_fn(rows, cols, |r, c| {
        (trajectory[[r, c]] - means[c]) / stds[c]
    }))
}

/// Symmetric positive-definite inverse square root via eigendecomposition.
fn symmetric_inverse_sqrt(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let eigen = SymmetricEigen::new(matrix.clone());
    let inv_sqrt = DMatrix::from_diagonal(
        &eigen
            .eigenvalues
            .map(|lambda| 1.0 / lambda.max(RIDGE).sqrt()),
    );
    &eigen.eigenvectors * inv_sqrt * eigen.eigenvectors.transpose()
}

/// Per-row scalar projection of a trajectory.
fn scalar_series(trajectory: &Array2<f64>, rows: usize) -> Vec<f64> {
    if trajectory.ncols() == 1 {
        (0..rows).map(|r| trajectory[[r, 0]]).collect()
    } else {
        (0..rows)
            .map(|r| {
                trajectory
                    .row(r)
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}
