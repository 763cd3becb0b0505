use foundation::Grid;

use super::edge::interior_map;

/// Similarity of each pixel to its 4-neighbourhood:
/// `max(0, 100 - mean(|neighbour - centre|))`. Constant input gives exactly 100.
pub fn coherence(grid: &Grid<f32>) -> Grid<f32> {
    interior_map(grid, |x, y| {
        let c = grid[(x, y)];
        let diff = (grid[(x, y - 1)] - c).abs()
            + (grid[(x, y + 1)] - c).abs()
            + (grid[(x - 1, y)] - c).abs()
            + (grid[(x + 1, y)] - c).abs();
        (100.0 - diff / 4.0).max(0.0)
    })
}

/// Vertical second derivative `a[y-1] - 2a[y] + a[y+1]`, signed.
pub fn curvature(grid: &Grid<f32>) -> Grid<f32> {
    interior_map(grid, |x, y| {
        grid[(x, y - 1)] - 2.0 * grid[(x, y)] + grid[(x, y + 1)]
    })
}

#[cfg(test)]
mod tests {
    use super::{coherence, curvature};
    use foundation::Grid;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn constant_grid_is_fully_coherent() {
        let g = Grid::filled(6, 5, 42.0f32);
        let c = coherence(&g);
        assert_eq!((c.width(), c.height()), (4, 3));
        assert!(c.as_slice().iter().all(|&v| v == 100.0));
    }

    #[test]
    fn coherence_never_negative() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = Grid::from_fn(20, 20, |_, _| rng.gen_range(-1000.0f32..1000.0));
        assert!(coherence(&g).as_slice().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn spike_drops_coherence_at_and_around_it() {
        let mut g = Grid::filled(5, 5, 0.0f32);
        g.set(2, 2, 40.0);
        let c = coherence(&g);
        assert_eq!(c[(1, 1)], 60.0);
        assert_eq!(c[(0, 1)], 90.0);
        assert_eq!(c[(0, 0)], 100.0);
    }

    #[test]
    fn curvature_of_linear_ramp_is_zero_and_parabola_constant() {
        let ramp = Grid::from_fn(4, 6, |_, y| 3.0 * y as f32);
        assert!(curvature(&ramp).as_slice().iter().all(|&v| v == 0.0));
        let bowl = Grid::from_fn(4, 6, |_, y| (y * y) as f32);
        assert!(curvature(&bowl).as_slice().iter().all(|&v| v == 2.0));
    }
}
