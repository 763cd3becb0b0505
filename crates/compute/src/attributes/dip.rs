use std::fmt;

use foundation::Grid;
use serde::Serialize;

use super::edge::interior_map;
use crate::analysis::RunningStats;
use crate::params::AttributeParams;

/// Eight-way compass bin, clockwise from north.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Octant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::N,
        Octant::NE,
        Octant::E,
        Octant::SE,
        Octant::S,
        Octant::SW,
        Octant::W,
        Octant::NW,
    ];

    /// Bins a `[0, 360)` azimuth; each octant spans 45 degrees centred on its heading.
    pub fn from_degrees(azimuth: f64) -> Self {
        let shifted = (azimuth + 22.5).rem_euclid(360.0);
        Self::ALL[((shifted / 45.0) as usize).min(7)]
    }

    /// Strike perpendicular to the dip direction.
    pub fn structural_trend(self) -> &'static str {
        match self {
            Octant::N | Octant::S => "E-W",
            Octant::NE | Octant::SW => "NW-SE",
            Octant::E | Octant::W => "N-S",
            Octant::SE | Octant::NW => "NE-SW",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Octant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DipAzimuthResult {
    /// Degrees from horizontal.
    pub dip: Grid<f32>,
    /// Degrees in `[0, 360)`.
    pub azimuth: Grid<f32>,
    pub average_dip: f64,
    pub max_dip: f64,
    pub dominant_azimuth: Octant,
}

impl DipAzimuthResult {
    pub fn structural_trend(&self) -> &'static str {
        self.dominant_azimuth.structural_trend()
    }
}

/// Maps degrees into `[0, 360)`. Angles a hair below zero can round up to
/// exactly 360 (in f64 or on the f32 store); those become 0.
fn wrap_degrees(degrees: f64) -> f32 {
    let wrapped = degrees.rem_euclid(360.0) as f32;
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

pub fn dip_azimuth(grid: &Grid<f32>, params: &AttributeParams) -> DipAzimuthResult {
    let depth_per_sample = params.depth_per_sample_m();
    let mut stats = RunningStats::default();
    let mut bins = [0usize; 8];
    let mut azimuth_at = Vec::new();

    let dip = interior_map(grid, |x, y| {
        let inline_gradient = f64::from(grid[(x + 1, y)] - grid[(x - 1, y)]) / 2.0;
        let vertical_gradient = f64::from(grid[(x, y + 1)] - grid[(x, y - 1)]) / 2.0;

        let dip = (vertical_gradient.abs() / params.trace_spacing_m * depth_per_sample)
            .atan()
            .to_degrees();
        let azimuth = wrap_degrees(vertical_gradient.atan2(inline_gradient).to_degrees());

        stats.record(dip);
        bins[Octant::from_degrees(f64::from(azimuth)).index()] += 1;
        azimuth_at.push(azimuth);
        dip as f32
    });
    let azimuth = Grid::from_vec(dip.width(), dip.height(), azimuth_at)
        .unwrap_or_else(|_| Grid::zeros(0, 0));

    let mut dominant = Octant::N;
    let mut best = 0;
    for octant in Octant::ALL {
        if bins[octant.index()] > best {
            best = bins[octant.index()];
            dominant = octant;
        }
    }

    DipAzimuthResult {
        dip,
        azimuth,
        average_dip: stats.mean(),
        max_dip: if stats.count == 0 { 0.0 } else { stats.max },
        dominant_azimuth: dominant,
    }
}

#[cfg(test)]
mod tests {
    use super::{Octant, dip_azimuth};
    use crate::params::AttributeParams;
    use foundation::Grid;

    #[test]
    fn flat_reflector_has_zero_dip() {
        // Amplitude varies only along x: zero vertical gradient everywhere.
        let g = Grid::from_fn(12, 10, |x, _| (x as f32 * 0.7).sin() * 50.0);
        let r = dip_azimuth(&g, &AttributeParams::default());
        assert_eq!((r.dip.width(), r.dip.height()), (10, 8));
        assert_eq!(r.average_dip, 0.0);
        assert!(r.dip.as_slice().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn vertical_ramp_dips_east_of_north_by_formula() {
        let g = Grid::from_fn(5, 5, |_, y| y as f32 * 2.0);
        let p = AttributeParams::default();
        let r = dip_azimuth(&g, &p);
        // vertical gradient 2 -> atan(2 / 25 * 8)
        let expected = (2.0f64 / 25.0 * 8.0).atan().to_degrees();
        assert!((r.max_dip - expected).abs() < 1e-6);
        assert!((f64::from(r.azimuth[(0, 0)]) - 90.0).abs() < 1e-4);
        assert_eq!(r.dominant_azimuth, Octant::E);
        assert_eq!(r.structural_trend(), "N-S");
    }

    #[test]
    fn velocity_changes_dip() {
        let g = Grid::from_fn(5, 5, |_, y| y as f32);
        let slow = dip_azimuth(&g, &AttributeParams::default());
        let fast = dip_azimuth(
            &g,
            &AttributeParams {
                velocity_mps: 4000.0,
                ..AttributeParams::default()
            },
        );
        assert!(fast.average_dip > slow.average_dip);
    }

    #[test]
    fn azimuth_stays_below_a_full_turn() {
        // A subnormal upward step gives an angle just under zero.
        let g = Grid::from_fn(3, 3, |x, y| match (x, y) {
            (2, 1) => 2.0,
            (1, 2) => -1e-44,
            _ => 0.0,
        });
        let r = dip_azimuth(&g, &AttributeParams::default());
        let az = r.azimuth[(0, 0)];
        assert!((0.0..360.0).contains(&az), "azimuth {az}");
        assert_eq!(az, 0.0);
        assert_eq!(r.dominant_azimuth, Octant::N);

        assert_eq!(super::wrap_degrees(-1e-12), 0.0);
        assert_eq!(super::wrap_degrees(-90.0), 270.0);
        assert_eq!(super::wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn octant_binning_edges() {
        assert_eq!(Octant::from_degrees(0.0), Octant::N);
        assert_eq!(Octant::from_degrees(337.5), Octant::N);
        assert_eq!(Octant::from_degrees(22.5), Octant::NE);
        assert_eq!(Octant::from_degrees(180.0), Octant::S);
        assert_eq!(Octant::from_degrees(292.4), Octant::W);
        assert_eq!(Octant::NW.structural_trend(), "NE-SW");
    }

    #[test]
    fn tiny_grid_is_empty_with_zero_stats() {
        let r = dip_azimuth(&Grid::zeros(2, 2), &AttributeParams::default());
        assert!(r.dip.is_empty() && r.azimuth.is_empty());
        assert_eq!((r.average_dip, r.max_dip), (0.0, 0.0));
        assert_eq!(r.dominant_azimuth, Octant::N);
    }
}
