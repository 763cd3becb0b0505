use foundation::precision::stable_total_cmp_f64;

use crate::interpolate::ScatterPoint;

pub struct SpatialAnalysis;

impl SpatialAnalysis {
    /// Returns (index, squared distance).
    ///
    /// Ties go to the earlier point, so coincident picks resolve in list order.
    pub fn nearest_point(points: &[ScatterPoint], x: f64, y: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in points.iter().enumerate() {
            let dx = p.x - x;
            let dy = p.y - y;
            let d2 = dx * dx + dy * dy;
            if best
                .map(|(_, bd2)| stable_total_cmp_f64(d2, bd2).is_lt())
                .unwrap_or(true)
            {
                best = Some((i, d2));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialAnalysis;
    use crate::interpolate::ScatterPoint;

    #[test]
    fn nearest_point_picks_closest() {
        let pts = vec![ScatterPoint::new(0.0, 0.0, 1.0), ScatterPoint::new(10.0, 0.0, 2.0)];
        let (i, d2) = SpatialAnalysis::nearest_point(&pts, 9.0, 0.0).unwrap();
        assert_eq!(i, 1);
        assert!(d2 < 2.0);
        assert!(SpatialAnalysis::nearest_point(&[], 0.0, 0.0).is_none());
    }

    #[test]
    fn coincident_points_resolve_to_first() {
        let pts = vec![ScatterPoint::new(5.0, 5.0, 1.0), ScatterPoint::new(5.0, 5.0, 2.0)];
        assert_eq!(SpatialAnalysis::nearest_point(&pts, 5.0, 5.0), Some((0, 0.0)));
    }
}
