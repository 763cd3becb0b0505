use foundation::Grid;

/// Interior finite-difference kernel: applies `f(x, y)` to every pixel with
/// a 1-sample halo on all sides. Output is `(w - 2) x (h - 2)`, or empty
/// when either side is shorter than 3.
pub(crate) fn interior_map(grid: &Grid<f32>, mut f: impl FnMut(usize, usize) -> f32) -> Grid<f32> {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        return Grid::zeros(0, 0);
    }
    Grid::from_fn(w - 2, h - 2, |x, y| f(x + 1, y + 1))
}

/// Inclusive `[start, end]` rows of a vertical window centered on `y`,
/// clipped at the grid top and bottom.
pub(crate) fn vertical_window(y: usize, height: usize, window_size: usize) -> (usize, usize) {
    let half = window_size / 2;
    (y.saturating_sub(half), (y + half).min(height.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::{interior_map, vertical_window};
    use foundation::Grid;

    #[test]
    fn window_clips_at_edges() {
        assert_eq!(vertical_window(0, 100, 25), (0, 12));
        assert_eq!(vertical_window(50, 100, 25), (38, 62));
        assert_eq!(vertical_window(99, 100, 25), (87, 99));
        assert_eq!(vertical_window(3, 10, 1), (3, 3));
    }

    #[test]
    fn interior_skips_halo() {
        let g = Grid::from_fn(5, 4, |x, y| (x + 10 * y) as f32);
        let out = interior_map(&g, |x, y| g[(x, y)]);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.row(0), &[11.0, 12.0, 13.0]);
        assert!(interior_map(&Grid::zeros(2, 9), |_, _| 1.0).is_empty());
    }
}
