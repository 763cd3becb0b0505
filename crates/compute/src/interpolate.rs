use crate::analysis::SpatialAnalysis;

/// A sparse sample handed to the interpolator, in picking-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl ScatterPoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }
}

/// Inverse-distance weighting.
///
/// A query closer than `snap_radius` to a source point returns the nearest
/// such point's value exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Idw {
    pub power: f64,
    pub snap_radius: f64,
}

impl Default for Idw {
    fn default() -> Self {
        Self {
            power: 2.0,
            snap_radius: 0.1,
        }
    }
}

impl Idw {
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// `None` only when `points` is empty.
    pub fn interpolate(&self, points: &[ScatterPoint], x: f64, y: f64) -> Option<f64> {
        let (nearest, nearest_d2) = SpatialAnalysis::nearest_point(points, x, y)?;
        if nearest_d2.sqrt() < self.snap_radius {
            return Some(points[nearest].value);
        }

        let half_power = self.power / 2.0;
        let mut weighted = 0.0;
        let mut total = 0.0;
        for p in points {
            let dx = p.x - x;
            let dy = p.y - y;
            let w = 1.0 / (dx * dx + dy * dy).powf(half_power);
            weighted += w * p.value;
            total += w;
        }
        Some(weighted / total)
    }
}
