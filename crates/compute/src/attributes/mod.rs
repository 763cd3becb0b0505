//! Per-pixel and windowed attributes derived from a 2-D amplitude grid.
//!
//! Every transform is pure and reads only the grid it is given. Kernels
//! that need neighbours skip a 1-sample border; windowed ones clip.

mod amplitude;
mod coherence;
mod dip;
mod edge;
mod window;

use std::fmt;
use std::str::FromStr;

use foundation::Grid;
use tracing::debug;

pub use amplitude::extract_amplitude;
pub use coherence::{coherence, curvature};
pub use dip::{DipAzimuthResult, Octant, dip_azimuth};
pub use window::{Contrast, MaxMagnitudeResult, Polarity, RmsResult, max_magnitude, rms_amplitude};

use crate::params::AttributeParams;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Coherence,
    Curvature,
    Rms,
    MaxMagnitude,
    DipAzimuth,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 5] = [
        AttributeKind::Coherence,
        AttributeKind::Curvature,
        AttributeKind::Rms,
        AttributeKind::MaxMagnitude,
        AttributeKind::DipAzimuth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Coherence => "coherence",
            AttributeKind::Curvature => "curvature",
            AttributeKind::Rms => "rms",
            AttributeKind::MaxMagnitude => "max-magnitude",
            AttributeKind::DipAzimuth => "dip-azimuth",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute(pub String);

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown attribute '{}' (expected one of coherence, curvature, rms, max-magnitude, dip-azimuth)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAttribute {}

impl FromStr for AttributeKind {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "coherence" => Ok(AttributeKind::Coherence),
            "curvature" => Ok(AttributeKind::Curvature),
            "rms" | "rms-amplitude" => Ok(AttributeKind::Rms),
            "max-magnitude" | "maxmag" => Ok(AttributeKind::MaxMagnitude),
            "dip-azimuth" | "dip" => Ok(AttributeKind::DipAzimuth),
            _ => Err(UnknownAttribute(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeResult {
    Coherence(Grid<f32>),
    Curvature(Grid<f32>),
    Rms(RmsResult),
    MaxMagnitude(MaxMagnitudeResult),
    DipAzimuth(DipAzimuthResult),
}

impl AttributeResult {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeResult::Coherence(_) => AttributeKind::Coherence,
            AttributeResult::Curvature(_) => AttributeKind::Curvature,
            AttributeResult::Rms(_) => AttributeKind::Rms,
            AttributeResult::MaxMagnitude(_) => AttributeKind::MaxMagnitude,
            AttributeResult::DipAzimuth(_) => AttributeKind::DipAzimuth,
        }
    }

    /// The grid a viewer would display; dip for dip/azimuth.
    pub fn grid(&self) -> &Grid<f32> {
        match self {
            AttributeResult::Coherence(g) | AttributeResult::Curvature(g) => g,
            AttributeResult::Rms(r) => &r.grid,
            AttributeResult::MaxMagnitude(r) => &r.grid,
            AttributeResult::DipAzimuth(r) => &r.dip,
        }
    }
}

pub fn compute_attribute(
    kind: AttributeKind,
    grid: &Grid<f32>,
    params: &AttributeParams,
) -> AttributeResult {
    debug!(
        attribute = %kind,
        width = grid.width(),
        height = grid.height(),
        "computing attribute"
    );
    match kind {
        AttributeKind::Coherence => AttributeResult::Coherence(coherence(grid)),
        AttributeKind::Curvature => AttributeResult::Curvature(curvature(grid)),
        AttributeKind::Rms => AttributeResult::Rms(rms_amplitude(grid, params.window_size)),
        AttributeKind::MaxMagnitude => AttributeResult::MaxMagnitude(max_magnitude(grid, params)),
        AttributeKind::DipAzimuth => AttributeResult::DipAzimuth(dip_azimuth(grid, params)),
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeKind, AttributeResult, compute_attribute};
    use crate::params::AttributeParams;
    use foundation::Grid;

    #[test]
    fn dispatch_tags_result_with_requested_kind() {
        let g = Grid::from_fn(8, 8, |x, y| (x as f32 - y as f32) * 3.0);
        let p = AttributeParams::default();
        for kind in AttributeKind::ALL {
            let r = compute_attribute(kind, &g, &p);
            assert_eq!(r.kind(), kind);
            let expected = match kind {
                AttributeKind::Rms | AttributeKind::MaxMagnitude => (8, 8),
                _ => (6, 6),
            };
            assert_eq!((r.grid().width(), r.grid().height()), expected);
        }
    }

    #[test]
    fn names_round_trip_and_aliases_parse() {
        for kind in AttributeKind::ALL {
            assert_eq!(kind.as_str().parse::<AttributeKind>(), Ok(kind));
        }
        assert_eq!("RMS_Amplitude".parse::<AttributeKind>(), Ok(AttributeKind::Rms));
        assert!("semblance".parse::<AttributeKind>().is_err());
    }

    #[test]
    fn source_grid_is_untouched() {
        let g = Grid::from_fn(5, 5, |x, y| (x * y) as f32);
        let before = g.clone();
        if let AttributeResult::Curvature(out) =
            compute_attribute(AttributeKind::Curvature, &g, &AttributeParams::default())
        {
            assert_eq!(out.width(), 3);
        }
        assert_eq!(g, before);
    }
}
