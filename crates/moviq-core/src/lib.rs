//! # Moviq-Core
//!
//! Core types and signal plumbing for the moviq movement-quality
//! analysis system: the sliding-window ingestion buffer, geometric value
//! types, digital pre-filters, and the FFT-backed transforms the
//! analyzers in `moviq-metrics` are built on.

pub mod error;
pub mod filters;
pub mod spectral;
pub mod stats;
pub mod types;
pub mod window;

pub use error::{Error, Result};
pub use filters::{BandpassFilter, ButterworthFilter, SavitzkyGolayFilter};
pub use spectral::{
    analytic_signal, instantaneous_phase, magnitude_spectrum, normalized_cross_correlation,
    peak_cross_correlation, LagCorrelation,
};
pub use types::{Point2, Point3, Timestamp};
pub use window::SlidingWindow;
