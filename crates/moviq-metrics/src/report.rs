//! Stable metric reporting across all analyzers.

use std::collections::BTreeMap;

/// Named scalar metrics with a stable key set.
///
/// Every analyzer result implements this trait so downstream consumers see
/// the same keys in the same order on every call: a metric that could not
/// be computed is reported as NaN, never omitted. Serialization layers can
/// therefore build uniform records without per-analyzer special cases.
pub trait MetricSet {
    /// Metric names paired with values, in a fixed order.
    fn metrics(&self) -> Vec<(&'static str, f64)>;

    /// The metrics as an ordered map.
    fn to_map(&self) -> BTreeMap<String, f64> {
        self.metrics()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake;

    impl MetricSet for Fake {
        fn metrics(&self) -> Vec<(&'static str, f64)> {
            vec![("a", 1.0), ("b", f64::NAN)]
        }
    }

    #[test]
    fn test_map_keeps_nan_keys() {
        let map = Fake.to_map();
        assert_eq!(map.len(), 2);
        assert!(map["b"].is_nan(), "undefined metrics must stay present");
    }
}
