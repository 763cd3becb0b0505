/// Axis-aligned 2-D extent in slice pixel space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Extent2 { min, max }
    }

    /// Extent anchored at the origin, e.g. the `width x height` picking canvas.
    pub fn from_size(width: f64, height: f64) -> Self {
        Extent2::new([0.0, 0.0], [width, height])
    }

    pub fn of_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut out = Extent2::new(first, first);
        for p in it {
            out.min[0] = out.min[0].min(p[0]);
            out.min[1] = out.min[1].min(p[1]);
            out.max[0] = out.max[0].max(p[0]);
            out.max[1] = out.max[1].max(p[1]);
        }
        Some(out)
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

#[cfg(test)]
mod tests {
    use super::Extent2;

    #[test]
    fn extent_of_points() {
        let e = Extent2::of_points([[3.0, 1.0], [-1.0, 4.0], [2.0, 2.0]]).unwrap();
        assert_eq!(e.min, [-1.0, 1.0]);
        assert_eq!(e.max, [3.0, 4.0]);
        assert_eq!(e.width(), 4.0);
        assert!(Extent2::of_points(std::iter::empty()).is_none());
    }
}
