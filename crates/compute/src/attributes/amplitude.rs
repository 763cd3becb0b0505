use foundation::Grid;
use survey::PickedPoint;

/// Amplitude under each picked point (coordinates floored), 0 off-grid or
/// for non-finite coordinates.
pub fn extract_amplitude(points: &[PickedPoint], grid: &Grid<f32>) -> Vec<f32> {
    points
        .iter()
        .map(|p| {
            if !p.x.is_finite() || !p.y.is_finite() || p.x < 0.0 || p.y < 0.0 {
                return 0.0;
            }
            grid.get(p.x.floor() as usize, p.y.floor() as usize)
                .unwrap_or(0.0)
        })
        .collect()
}
