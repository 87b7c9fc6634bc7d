//! # Moviq-Stream
//!
//! Real-time orchestration for the moviq analyzers: per-channel sliding
//! windows fed by a frame ingestion loop, snapshot-based analysis calls,
//! and timestamped serializable records for downstream consumers.
//!
//! The analyzers themselves stay pure; this crate owns the mutable state
//! (one window per channel) and the mutual exclusion around it.

pub mod record;
pub mod session;

pub use record::AnalysisRecord;
pub use session::{MovementSession, SessionConfig};
