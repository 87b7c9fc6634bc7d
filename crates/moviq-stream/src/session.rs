//! Real-time session orchestration over per-channel sliding windows.
//!
//! A session owns one `SlidingWindow` per named channel (typically one
//! marker or joint per channel), feeds them from the caller's ingestion
//! loop, and runs the pure analyzers from `moviq-metrics` over snapshots
//! on demand. Windows are created lazily: the first row ingested for a
//! channel fixes its column count.
//!
//! Concurrent access is serialized by an async read-write lock; the
//! windows themselves stay lock-free as the core contract requires.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::RwLock;

use moviq_core::{Error, Point2, Result, SlidingWindow, Timestamp};
use moviq_metrics::{
    BilateralSymmetryAnalyzer, EquilibriumAnalyzer, EquilibriumConfig, SmoothnessAnalyzer,
    SmoothnessConfig, SymmetryConfig, SyncConfig, SynchronizationAnalyzer,
};

use crate::record::AnalysisRecord;

/// Session-wide configuration
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// Rows retained per channel window
    pub capacity: usize,
    pub smoothness: SmoothnessConfig,
    pub symmetry: SymmetryConfig,
    pub sync: SyncConfig,
    pub equilibrium: EquilibriumConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            smoothness: SmoothnessConfig::default(),
            symmetry: SymmetryConfig::default(),
            sync: SyncConfig::default(),
            equilibrium: EquilibriumConfig::default(),
        }
    }
}

/// Streaming movement-analysis session
#[derive(Debug)]
pub struct MovementSession {
    config: SessionConfig,
    smoothness: SmoothnessAnalyzer,
    symmetry: BilateralSymmetryAnalyzer,
    sync: SynchronizationAnalyzer,
    equilibrium: EquilibriumAnalyzer,
    windows: RwLock<HashMap<String, SlidingWindow>>,
}

impl MovementSession {
    /// Build a session, validating every analyzer configuration up front.
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(Error::WindowConfig {
                capacity: 0,
                columns: 1,
            });
        }

        Ok(Self {
            smoothness: SmoothnessAnalyzer::new(config.smoothness)?,
            symmetry: BilateralSymmetryAnalyzer::new(config.symmetry)?,
            sync: SynchronizationAnalyzer::new(config.sync)?,
            equilibrium: EquilibriumAnalyzer::new(config.equilibrium)?,
            config,
            windows: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ingest one frame for a channel.
    ///
    /// The first row fixes the channel's column count; later rows must
    /// match it exactly.
    pub async fn ingest(&self, channel: &str, row: &[f64], timestamp: Timestamp) -> Result<()> {
        let mut windows = self.windows.write().await;

        if !windows.contains_key(channel) {
            let window = SlidingWindow::new(self.config.capacity, row.len())?;
            windows.insert(channel.to_string(), window);
            tracing::debug!(channel, columns = row.len(), "channel window created");
        }

        windows
            .get_mut(channel)
            .expect("window inserted above")
            .append_at(row, timestamp)
    }

    /// Smoothness metrics over a channel's first column.
    pub async fn analyze_smoothness(&self, channel: &str) -> Result<AnalysisRecord> {
        let windows = self.windows.read().await;
        let window = lookup(&windows, channel)?;

        if !window.is_ready(moviq_metrics::MIN_SPARC_SAMPLES) {
            tracing::warn!(
                channel,
                rows = window.len(),
                "window below smoothness minimum; metrics will be NaN"
            );
        }

        let started = Instant::now();
        let metrics = self.smoothness.analyze_window(window);

        Ok(AnalysisRecord::new(
            channel,
            newest_timestamp(window),
            started.elapsed().as_secs_f64(),
            &metrics,
        ))
    }

    /// Bilateral symmetry between two channels' full trajectories.
    pub async fn analyze_symmetry(&self, left: &str, right: &str) -> Result<AnalysisRecord> {
        let windows = self.windows.read().await;
        let left_window = lookup(&windows, left)?;
        let right_window = lookup(&windows, right)?;

        let started = Instant::now();
        let metrics = self
            .symmetry
            .analyze(&left_window.to_array(), &right_window.to_array());

        Ok(AnalysisRecord::new(
            format!("{left}:{right}"),
            newest_timestamp(left_window).max(newest_timestamp(right_window)),
            started.elapsed().as_secs_f64(),
            &metrics,
        ))
    }

    /// Synchronization between two channels' first columns.
    pub async fn analyze_sync(&self, a: &str, b: &str) -> Result<AnalysisRecord> {
        let windows = self.windows.read().await;
        let window_a = lookup(&windows, a)?;
        let window_b = lookup(&windows, b)?;

        let x = window_a.column(0).unwrap_or_default();
        let y = window_b.column(0).unwrap_or_default();

        let started = Instant::now();
        let metrics = self.sync.analyze(&x, &y);

        Ok(AnalysisRecord::new(
            format!("{a}:{b}"),
            newest_timestamp(window_a).max(newest_timestamp(window_b)),
            started.elapsed().as_secs_f64(),
            &metrics,
        ))
    }

    /// Equilibrium for one frame of foot and barycenter positions.
    ///
    /// Stateless per frame, so positions come from the caller rather than
    /// a window.
    pub fn analyze_equilibrium(
        &self,
        left_foot: Point2,
        right_foot: Point2,
        barycenter: Point2,
        timestamp: Timestamp,
    ) -> AnalysisRecord {
        let started = Instant::now();
        let metrics = self.equilibrium.analyze(left_foot, right_foot, barycenter);

        AnalysisRecord::new(
            "equilibrium",
            timestamp,
            started.elapsed().as_secs_f64(),
            &metrics,
        )
    }

    /// Names of all channels seen so far.
    pub async fn channels(&self) -> Vec<String> {
        let windows = self.windows.read().await;
        windows.keys().cloned().collect()
    }

    /// Rows currently buffered for a channel.
    pub async fn channel_len(&self, channel: &str) -> Result<usize> {
        let windows = self.windows.read().await;
        Ok(lookup(&windows, channel)?.len())
    }

    /// Drop a channel and its buffered rows.
    pub async fn clear(&self, channel: &str) {
        let mut windows = self.windows.write().await;
        windows.remove(channel);
    }

    /// Drop every channel.
    pub async fn clear_all(&self) {
        let mut windows = self.windows.write().await;
        windows.clear();
    }
}

fn lookup<'a>(
    windows: &'a HashMap<String, SlidingWindow>,
    channel: &str,
) -> Result<&'a SlidingWindow> {
    windows
        .get(channel)
        .ok_or_else(|| Error::UnknownChannel(channel.to_string()))
}

fn newest_timestamp(window: &SlidingWindow) -> Timestamp {
    window
        .timestamps()
        .last()
        .copied()
        .unwrap_or_else(Timestamp::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn test_session() -> MovementSession {
        MovementSession::new(SessionConfig {
            capacity: 128,
            smoothness: SmoothnessConfig {
                rate_hz: 100.0,
                use_filter: false,
            },
            ..SessionConfig::default()
        })
        .unwrap()
    }

    async fn feed_sine(session: &MovementSession, channel: &str, phase: f64, n: usize) {
        for i in 0..n {
            let value = 2.0 + (2.0 * PI * 3.0 * i as f64 / 100.0 + phase).sin();
            session
                .ingest(channel, &[value], Timestamp::from_nanos(i as i64 * 10_000_000))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_session_workflow() {
        let session = test_session();

        feed_sine(&session, "wrist_l", 0.0, 100).await;
        feed_sine(&session, "wrist_r", 0.0, 100).await;

        let smoothness = session.analyze_smoothness("wrist_l").await.unwrap();
        assert!(smoothness.get("sparc").unwrap().is_finite());
        assert_eq!(smoothness.timestamp.as_nanos(), 99 * 10_000_000);

        let symmetry = session.analyze_symmetry("wrist_l", "wrist_r").await.unwrap();
        assert!((symmetry.get("cca").unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(symmetry.channel, "wrist_l:wrist_r");

        let sync = session.analyze_sync("wrist_l", "wrist_r").await.unwrap();
        assert!(sync.get("plv").unwrap() > 0.99);

        session.clear("wrist_l").await;
        assert!(session.analyze_smoothness("wrist_l").await.is_err());
        assert_eq!(session.channels().await, vec!["wrist_r".to_string()]);
    }

    #[tokio::test]
    async fn test_ingest_rejects_width_change() {
        let session = test_session();

        session
            .ingest("pelvis", &[1.0, 2.0, 3.0], Timestamp::from_nanos(0))
            .await
            .unwrap();

        let err = session
            .ingest("pelvis", &[1.0], Timestamp::from_nanos(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RowWidth {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_short_window_yields_nan_record() {
        let session = test_session();

        session
            .ingest("ankle", &[1.0], Timestamp::from_nanos(0))
            .await
            .unwrap();

        let record = session.analyze_smoothness("ankle").await.unwrap();
        assert!(record.get("sparc").unwrap().is_nan());
    }

    #[tokio::test]
    async fn test_capacity_bounds_memory() {
        let session = MovementSession::new(SessionConfig {
            capacity: 16,
            ..SessionConfig::default()
        })
        .unwrap();

        feed_sine(&session, "hip", 0.0, 500).await;
        assert_eq!(session.channel_len("hip").await.unwrap(), 16);
    }

    #[test]
    fn test_equilibrium_record() {
        let session = test_session();

        let record = session.analyze_equilibrium(
            Point2::new(0.0, 0.0),
            Point2::new(400.0, 0.0),
            Point2::new(200.0, 0.0),
            Timestamp::from_nanos(5),
        );

        assert!((record.get("index").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(record.channel, "equilibrium");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = MovementSession::new(SessionConfig {
            capacity: 0,
            ..SessionConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::WindowConfig { .. }));
    }
}
