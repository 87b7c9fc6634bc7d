//! Error types for the moviq movement-analysis system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid window configuration: capacity {capacity}, columns {columns}")]
    WindowConfig { capacity: usize, columns: usize },

    #[error("row width mismatch: expected {expected} columns, got {actual}")]
    RowWidth { expected: usize, actual: usize },

    #[error("insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: usize, available: usize },

    #[error("sampling rate out of range: {0} Hz")]
    InvalidRate(f64),

    #[error("ellipse margin must be positive, got {0}")]
    InvalidMargin(f64),

    #[error("axis weight must be positive, got {0}")]
    InvalidWeight(f64),

    #[error("window overlap must lie in [0, 1), got {0}")]
    InvalidOverlap(f64),

    #[error("analysis window of {size} samples is below the minimum of {minimum}")]
    InvalidWindowSize { size: usize, minimum: usize },

    #[error("maximum lag must be at least 1, got {0}")]
    InvalidLag(usize),

    #[error("band edges must satisfy 0 < low < high < rate/2: low {low_hz} Hz, high {high_hz} Hz, rate {rate_hz} Hz")]
    FilterBand {
        low_hz: f64,
        high_hz: f64,
        rate_hz: f64,
    },

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
