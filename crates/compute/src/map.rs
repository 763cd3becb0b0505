//! Structure and isochron maps from picked horizons.

use std::fmt;
use std::str::FromStr;

use foundation::{Extent2, Grid};
use serde::Serialize;
use survey::Horizon;
use tracing::{info, warn};

use crate::analysis::Statistics;
use crate::contour::{ContourLine, contour_levels, trace_contours};
use crate::interpolate::{Idw, ScatterPoint};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Two-way time of a single horizon.
    Structure,
    /// Time thickness between the first two horizons.
    Isochron,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapMode::Structure => "Structure Map",
            MapMode::Isochron => "Isochron Map",
        })
    }
}

impl FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structure" => Ok(MapMode::Structure),
            "isochron" => Ok(MapMode::Isochron),
            other => Err(format!("unknown map mode '{other}' (expected structure or isochron)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    NoHorizons,
    EmptyHorizon { name: String },
    NeedTwoHorizons { found: usize },
    InvalidGrid { width: usize, height: usize },
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::NoHorizons => {
                write!(f, "no horizons to map; pick at least one horizon first")
            }
            PreconditionError::EmptyHorizon { name } => {
                write!(f, "horizon '{name}' has no picked points")
            }
            PreconditionError::NeedTwoHorizons { found } => write!(
                f,
                "isochron map needs at least 2 horizons, found {found}"
            ),
            PreconditionError::InvalidGrid { width, height } => {
                write!(f, "map grid must be non-empty, got {width}x{height}")
            }
        }
    }
}

impl std::error::Error for PreconditionError {}

#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub mode: MapMode,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Picking-space area the output grid covers.
    pub extent: Extent2,
    pub contour_intervals: usize,
    pub idw: Idw,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            mode: MapMode::Structure,
            grid_width: 400,
            grid_height: 300,
            extent: Extent2::from_size(800.0, 600.0),
            contour_intervals: 12,
            idw: Idw::default(),
        }
    }
}

impl MapRequest {
    pub fn new(mode: MapMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    /// Picking-space coordinates of output cell `(gx, gy)`.
    pub fn cell_position(&self, gx: usize, gy: usize) -> (f64, f64) {
        let x = self.extent.min[0] + gx as f64 / self.grid_width as f64 * self.extent.width();
        let y = self.extent.min[1] + gy as f64 / self.grid_height as f64 * self.extent.height();
        (x, y)
    }
}

/// Summary of the source scalar values (not the interpolated grid).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStats {
    pub mode: MapMode,
    pub horizons: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// `max - min`: relief for structure maps, thickness variation for isochrons.
    pub variation: f64,
    pub points: usize,
    /// Isochron only: the two horizons differ in point count or their
    /// index-paired points sit at different traces.
    pub pairing_mismatch: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapResult {
    pub grid: Grid<f64>,
    pub stats: MapStats,
    pub levels: Vec<f64>,
    pub contours: Vec<ContourLine>,
}

/// Structure values: the explicit point value if present, else the time row.
pub fn structure_points(horizon: &Horizon) -> Vec<ScatterPoint> {
    horizon
        .points
        .iter()
        .map(|p| ScatterPoint::new(p.x, p.y, p.structure_value()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thickness {
    pub points: Vec<ScatterPoint>,
    pub mismatch: bool,
}

/// Pairs `top` and `base` by list index, stopping at the shorter list.
/// Each thickness is `|base.y - top.y|` placed at the top point.
pub fn isochron_points(top: &Horizon, base: &Horizon) -> Thickness {
    let mut mismatch = top.points.len() != base.points.len();
    let points = top
        .points
        .iter()
        .zip(&base.points)
        .map(|(t, b)| {
            if (t.x - b.x).abs() > 1.0 {
                mismatch = true;
            }
            ScatterPoint::new(t.x, t.y, (b.y - t.y).abs())
        })
        .collect();
    Thickness { points, mismatch }
}

/// Evaluates IDW at every output cell.
pub fn interpolate_grid(points: &[ScatterPoint], request: &MapRequest) -> Grid<f64> {
    Grid::from_fn(request.grid_width, request.grid_height, |gx, gy| {
        let (x, y) = request.cell_position(gx, gy);
        request.idw.interpolate(points, x, y).unwrap_or(0.0)
    })
}

fn require_points<'a>(horizon: &'a Horizon) -> Result<&'a Horizon, PreconditionError> {
    if horizon.points.is_empty() {
        return Err(PreconditionError::EmptyHorizon {
            name: horizon.name.clone(),
        });
    }
    Ok(horizon)
}

pub fn generate_map(
    horizons: &[Horizon],
    request: &MapRequest,
) -> Result<MapResult, PreconditionError> {
    if request.grid_width == 0 || request.grid_height == 0 {
        return Err(PreconditionError::InvalidGrid {
            width: request.grid_width,
            height: request.grid_height,
        });
    }

    let (points, names, pairing_mismatch) = match request.mode {
        MapMode::Structure => {
            let horizon = require_points(horizons.first().ok_or(PreconditionError::NoHorizons)?)?;
            (structure_points(horizon), vec![horizon.name.clone()], false)
        }
        MapMode::Isochron => {
            let [top, base, ..] = horizons else {
                return Err(PreconditionError::NeedTwoHorizons {
                    found: horizons.len(),
                });
            };
            let top = require_points(top)?;
            let base = require_points(base)?;
            let thickness = isochron_points(top, base);
            if thickness.mismatch {
                warn!(
                    top = %top.name,
                    base = %base.name,
                    top_points = top.points.len(),
                    base_points = base.points.len(),
                    "isochron pairs points by index but the horizons were picked on different traces"
                );
            }
            (
                thickness.points,
                vec![top.name.clone(), base.name.clone()],
                thickness.mismatch,
            )
        }
    };

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let (min, max) = Statistics::min_max(&values).unwrap_or((0.0, 0.0));
    let average = Statistics::mean(&values).unwrap_or(0.0);

    let grid = interpolate_grid(&points, request);
    let levels = contour_levels(min, max, request.contour_intervals);
    let contours = trace_contours(&grid, &levels);

    info!(
        mode = %request.mode,
        points = points.len(),
        min,
        max,
        contours = contours.len(),
        "generated map"
    );

    Ok(MapResult {
        grid,
        stats: MapStats {
            mode: request.mode,
            horizons: names,
            min,
            max,
            average,
            variation: max - min,
            points: points.len(),
            pairing_mismatch,
        },
        levels,
        contours,
    })
}

/// Blue to cyan to yellow to red display ramp for a normalised value.
pub fn color_ramp(normalized: f64) -> [u8; 3] {
    let t = if normalized.is_finite() {
        normalized.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if t < 0.33 {
        let s = t / 0.33;
        [0, (s * 200.0) as u8, 255]
    } else if t < 0.66 {
        let s = (t - 0.33) / 0.33;
        [(s * 255.0) as u8, 200, ((1.0 - s) * 255.0) as u8]
    } else {
        let s = (t - 0.66) / 0.34;
        [255, ((1.0 - s) * 200.0) as u8, 0]
    }
}
