//! Serializable analysis records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use moviq_core::Timestamp;
use moviq_metrics::MetricSet;

/// One timestamped analysis result, ready for downstream serialization.
///
/// The metric map carries every key the producing analyzer declares, NaN
/// included, so consumers see a uniform schema whether or not the window
/// held enough data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Channel (or channel pair) the record describes
    pub channel: String,
    /// Timestamp of the newest sample that entered the analysis
    pub timestamp: Timestamp,
    /// Wall-clock cost of the analysis call, in seconds
    pub elapsed_secs: f64,
    pub metrics: BTreeMap<String, f64>,
}

impl AnalysisRecord {
    pub fn new(
        channel: impl Into<String>,
        timestamp: Timestamp,
        elapsed_secs: f64,
        metrics: &dyn MetricSet,
    ) -> Self {
        Self {
            channel: channel.into(),
            timestamp,
            elapsed_secs,
            metrics: metrics.to_map(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviq_metrics::{SmoothnessAnalyzer, SmoothnessConfig};

    #[test]
    fn test_record_keeps_full_key_set() {
        let analyzer = SmoothnessAnalyzer::new(SmoothnessConfig {
            rate_hz: 100.0,
            use_filter: false,
        })
        .unwrap();

        // Too short for either metric: both keys must still be present
        let metrics = analyzer.analyze(&[1.0]);
        let record = AnalysisRecord::new("wrist_l", Timestamp::from_nanos(42), 0.001, &metrics);

        assert_eq!(record.metrics.len(), 2);
        assert!(record.get("sparc").unwrap().is_nan());
        assert!(record.get("jerk_rms").unwrap().is_nan());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let analyzer = SmoothnessAnalyzer::new(SmoothnessConfig {
            rate_hz: 100.0,
            use_filter: false,
        })
        .unwrap();

        let signal: Vec<f64> = (0..32).map(|i| (i as f64 * 0.3).sin()).collect();
        let metrics = analyzer.analyze(&signal);
        let record = AnalysisRecord::new("pelvis", Timestamp::from_nanos(7), 0.002, &metrics);

        let json = serde_json::to_string(&record).unwrap();
        let back: AnalysisRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.channel, "pelvis");
        assert_eq!(back.timestamp.as_nanos(), 7);
        assert!((back.get("jerk_rms").unwrap() - record.get("jerk_rms").unwrap()).abs() < 1e-12);
    }
}
