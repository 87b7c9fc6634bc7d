//! # Moviq-Metrics
//!
//! Movement-quality analyzers for kinematic time series, built for
//! motor-control, rehabilitation, and performance research.
//!
//! ## Metric families
//!
//! 1. **Smoothness** - SPARC (spectral arc length) and jerk RMS
//! 2. **Contraction-Expansion** - occupied area/volume and its rate
//! 3. **Equilibrium** - ellipse-normalized balance index over foot placement
//! 4. **Bilateral Symmetry** - CCA, PLV, CV symmetry, lagged correlation
//! 5. **Synchronization** - pairwise phase coupling, whole-signal or windowed
//!
//! Every analyzer is a pure transform over caller-supplied arrays or
//! `SlidingWindow` snapshots: configuration is validated once at
//! construction and fails fast with a typed error, while data-dependent
//! failure modes (too few samples, zero variance, zero mean) degrade to
//! NaN inside a result whose key set never changes.

pub mod contraction;
pub mod equilibrium;
pub mod report;
pub mod smoothness;
pub mod symmetry;
pub mod sync;

pub use contraction::*;
pub use equilibrium::*;
pub use report::*;
pub use smoothness::*;
pub use symmetry::*;
pub use sync::*;
