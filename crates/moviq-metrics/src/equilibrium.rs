//! Postural equilibrium from foot placement and barycenter position.
//!
//! A stability ellipse is fitted over the two feet: their axis-aligned
//! bounding box, expanded by a margin on all sides, gives the ellipse
//! center and semi-axes (the Y semi-axis additionally scaled by a weight
//! factor), and the foot-to-foot direction gives its orientation. The
//! barycenter is mapped into ellipse-local coordinates and scored with
//! the normalized quadratic form:
//!
//! index = 1 - sqrt((x/a)^2 + (y/b)^2)
//!
//! clamped to [0, 1]: 1.0 at the ellipse center, 0.0 on or outside the
//! boundary. Coordinates are whatever unit the capture system delivers
//! (millimeters for typical marker data); the margin shares that unit.

use serde::{Deserialize, Serialize};

use moviq_core::{Error, Point2, Point3, Result};

use crate::report::MetricSet;

/// Equilibrium analyzer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquilibriumConfig {
    /// Margin added around the foot bounding box, in input units
    pub margin: f64,
    /// Scale applied to the Y semi-axis
    pub y_weight: f64,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            margin: 100.0,
            y_weight: 0.5,
        }
    }
}

/// Equilibrium metric result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquilibriumMetrics {
    /// Balance index in [0, 1]; 1 = barycenter at the ellipse center
    pub index: f64,
    /// Foot-to-foot orientation angle in degrees
    pub angle_deg: f64,
}

impl MetricSet for EquilibriumMetrics {
    fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![("index", self.index), ("angle_deg", self.angle_deg)]
    }
}

/// Postural equilibrium analyzer
#[derive(Debug)]
pub struct EquilibriumAnalyzer {
    config: EquilibriumConfig,
}

impl EquilibriumAnalyzer {
    /// Create an analyzer; margin and Y weight must both be positive.
    pub fn new(config: EquilibriumConfig) -> Result<Self> {
        if config.margin <= 0.0 {
            return Err(Error::InvalidMargin(config.margin));
        }
        if config.y_weight <= 0.0 {
            return Err(Error::InvalidWeight(config.y_weight));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &EquilibriumConfig {
        &self.config
    }

    /// Score one frame of foot and barycenter positions.
    pub fn analyze(
        &self,
        left_foot: Point2,
        right_foot: Point2,
        barycenter: Point2,
    ) -> EquilibriumMetrics {
        let min_x = left_foot.x.min(right_foot.x) - self.config.margin;
        let max_x = left_foot.x.max(right_foot.x) + self.config.margin;
        let min_y = left_foot.y.min(right_foot.y) - self.config.margin;
        let max_y = left_foot.y.max(right_foot.y) + self.config.margin;

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;

        let semi_a = (max_x - min_x) / 2.0;
        let semi_b = (max_y - min_y) / 2.0 * self.config.y_weight;

        let angle = (right_foot.y - left_foot.y).atan2(right_foot.x - left_foot.x);
        let angle_deg = angle.to_degrees();

        // Degenerate ellipse axis: the index is 0 by policy, never NaN
        if semi_a <= 0.0 || semi_b <= 0.0 {
            return EquilibriumMetrics {
                index: 0.0,
                angle_deg,
            };
        }

        // Barycenter into ellipse-local coordinates: translate to the
        // center, rotate by the negative orientation angle
        let dx = barycenter.x - center_x;
        let dy = barycenter.y - center_y;

        let (sin, cos) = angle.sin_cos();
        let local_x = dx * cos + dy * sin;
        let local_y = -dx * sin + dy * cos;

        let norm = (local_x / semi_a).powi(2) + (local_y / semi_b).powi(2);

        let index = if norm <= 1.0 { 1.0 - norm.sqrt() } else { 0.0 };

        EquilibriumMetrics { index, angle_deg }
    }

    /// 3D convenience: feet and barycenter projected onto the ground plane.
    pub fn analyze_3d(
        &self,
        left_foot: Point3,
        right_foot: Point3,
        barycenter: Point3,
    ) -> EquilibriumMetrics {
        self.analyze(left_foot.xy(), right_foot.xy(), barycenter.xy())
    }
}
