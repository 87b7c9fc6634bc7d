//! Contraction-expansion analysis of body point configurations.
//!
//! Tracks how much space a set of markers occupies and how that occupancy
//! changes over time: a 2D quadrilateral area via the Shoelace formula, a
//! 3D polyhedron volume via tetrahedral decomposition, and a bounded
//! history tracker that classifies each frame as expanding, contracting,
//! or stable.
//!
//! Both geometric formulas assume the caller supplies points in a
//! consistent topological order frame over frame; the order is a
//! correctness precondition, not something checked numerically.

use serde::{Deserialize, Serialize};

use moviq_core::{Error, Point2, Point3, Result, SlidingWindow};

use crate::report::MetricSet;

/// Points required by the quadrilateral area formula
pub const QUAD_POINTS: usize = 4;

/// Fewest points forming a polyhedron with volume
pub const MIN_VOLUME_POINTS: usize = 4;

/// Area of a quadrilateral boundary via the Shoelace formula.
///
/// Exactly four points in cyclic order are required; any other count is a
/// configuration error rather than a silent zero.
pub fn quad_area(points: &[Point2]) -> Result<f64> {
    if points.len() != QUAD_POINTS {
        return Err(Error::InsufficientPoints {
            required: QUAD_POINTS,
            available: points.len(),
        });
    }

    let mut sum = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }

    Ok(0.5 * sum.abs())
}

/// Signed volume of a polyhedron via tetrahedral decomposition.
///
/// The first point is the shared apex; successive point triples form
/// tetrahedra whose scalar-triple-product volumes are summed. The sign
/// follows the caller's winding, so a consistent orientation across
/// frames keeps rates comparable.
pub fn polyhedron_volume(points: &[Point3]) -> Result<f64> {
    if points.len() < MIN_VOLUME_POINTS {
        return Err(Error::InsufficientPoints {
            required: MIN_VOLUME_POINTS,
            available: points.len(),
        });
    }

    let apex = points[0].to_vector();
    let mut volume = 0.0;

    for window in points[1..].windows(3) {
        let v1 = window[0].to_vector() - apex;
        let v2 = window[1].to_vector() - apex;
        let v3 = window[2].to_vector() - apex;
        volume += v1.dot(&v2.cross(&v3)) / 6.0;
    }

    Ok(volume)
}

/// Direction of the spatial measure between consecutive frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractionState {
    Contracting,
    Stable,
    Expanding,
}

impl ContractionState {
    /// Numeric encoding: -1 contracting, 0 stable, 1 expanding.
    pub fn as_f64(&self) -> f64 {
        match self {
            ContractionState::Contracting => -1.0,
            ContractionState::Stable => 0.0,
            ContractionState::Expanding => 1.0,
        }
    }
}

/// One tracked frame: the measure, its rate of change, and the state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContractionSample {
    /// Area or volume supplied for this frame
    pub value: f64,
    /// Difference to the previous frame (0.0 on the first frame)
    pub rate: f64,
    pub state: ContractionState,
}

impl MetricSet for ContractionSample {
    fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("value", self.value),
            ("rate", self.rate),
            ("state", self.state.as_f64()),
        ]
    }
}

/// Bounded-history tracker turning per-frame measures into rates
pub struct ContractionTracker {
    history: SlidingWindow,
    epsilon: f64,
}

impl ContractionTracker {
    /// Track the last `history` measures.
    pub fn new(history: usize) -> Result<Self> {
        Ok(Self {
            history: SlidingWindow::new(history, 1)?,
            epsilon: 1e-9,
        })
    }

    /// Rate magnitudes at or below `epsilon` are classified as stable.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Record the next measure and classify the transition.
    pub fn push(&mut self, value: f64) -> ContractionSample {
        let previous = self
            .history
            .column(0)
            .and_then(|col| col.last().copied());

        // SlidingWindow::append only fails on width mismatch; a 1-column
        // tracker row can't mismatch.
        let _ = self.history.append(&[value]);

        let rate = match previous {
            Some(prev) => value - prev,
            None => 0.0,
        };

        let state = if rate > self.epsilon {
            ContractionState::Expanding
        } else if rate < -self.epsilon {
            ContractionState::Contracting
        } else {
            ContractionState::Stable
        };

        ContractionSample { value, rate, state }
    }

    /// Tracked measures, oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.history.column(0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_unit_square_area() {
        let area = quad_area(&unit_square()).unwrap();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_area_invariant_to_winding_direction() {
        let mut reversed = unit_square();
        reversed.reverse();
        let area = quad_area(&reversed).unwrap();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_area_rejects_wrong_point_count() {
        let err = quad_area(&unit_square()[..3]).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientPoints {
                required: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_tetrahedron_volume() {
        // Right tetrahedron with unit legs: volume 1/6
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];

        let volume = polyhedron_volume(&points).unwrap();
        assert!((volume.abs() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_sign_follows_winding() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mut swapped = points.clone();
        swapped.swap(1, 2);

        let v1 = polyhedron_volume(&points).unwrap();
        let v2 = polyhedron_volume(&swapped).unwrap();
        assert!((v1 + v2).abs() < 1e-12, "winding swap should flip the sign");
    }

    #[test]
    fn test_volume_rejects_too_few_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(polyhedron_volume(&points).is_err());
    }

    #[test]
    fn test_tracker_states() {
        let mut tracker = ContractionTracker::new(8).unwrap();

        let first = tracker.push(1.0);
        assert_eq!(first.state, ContractionState::Stable);
        assert_eq!(first.rate, 0.0);

        let growing = tracker.push(1.5);
        assert_eq!(growing.state, ContractionState::Expanding);
        assert!((growing.rate - 0.5).abs() < 1e-12);

        let shrinking = tracker.push(0.75);
        assert_eq!(shrinking.state, ContractionState::Contracting);

        let steady = tracker.push(0.75);
        assert_eq!(steady.state, ContractionState::Stable);
    }

    #[test]
    fn test_tracker_history_is_bounded() {
        let mut tracker = ContractionTracker::new(3).unwrap();
        for i in 0..10 {
            tracker.push(i as f64);
        }
        assert_eq!(tracker.values(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_sample_metric_keys() {
        let mut tracker = ContractionTracker::new(2).unwrap();
        let sample = tracker.push(2.0);
        let map = sample.to_map();
        assert_eq!(map["state"], 0.0);
        assert_eq!(map["value"], 2.0);
    }
}
