//! Coarse iso-value contouring over a dense scalar grid.
//!
//! Crossings are found on the edge between each cell and its right and
//! lower neighbours, then chained greedily in raster order. Lines are not
//! guaranteed to close or to follow topology exactly; they are meant for
//! display only.

use foundation::Grid;

/// Maximum gap, in grid cells, between consecutive points of one polyline.
const CHAIN_DISTANCE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    /// `[x, y]` in fractional grid coordinates.
    pub points: Vec<[f64; 2]>,
}

/// `intervals + 1` evenly spaced levels from `min` to `max` inclusive.
/// Empty for a flat or inverted range.
pub fn contour_levels(min: f64, max: f64, intervals: usize) -> Vec<f64> {
    if intervals == 0 || !(max > min) {
        return Vec::new();
    }
    (0..=intervals)
        .map(|i| min + (i as f64 / intervals as f64) * (max - min))
        .collect()
}

fn crosses(a: f64, b: f64, level: f64) -> bool {
    (a < level) != (b < level)
}

fn lerp_offset(a: f64, b: f64, level: f64) -> f64 {
    ((level - a) / (b - a)).clamp(0.0, 1.0)
}

/// Edge crossings for one level, in raster order.
pub fn level_crossings(grid: &Grid<f64>, level: f64) -> Vec<[f64; 2]> {
    let (w, h) = (grid.width(), grid.height());
    let mut out = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = grid[(x, y)];
            if x + 1 < w {
                let right = grid[(x + 1, y)];
                if crosses(v, right, level) {
                    out.push([x as f64 + lerp_offset(v, right, level), y as f64]);
                }
            }
            if y + 1 < h {
                let below = grid[(x, y + 1)];
                if crosses(v, below, level) {
                    out.push([x as f64, y as f64 + lerp_offset(v, below, level)]);
                }
            }
        }
    }
    out
}

fn chain(level: f64, crossings: Vec<[f64; 2]>) -> Vec<ContourLine> {
    let max_d2 = CHAIN_DISTANCE * CHAIN_DISTANCE;
    let mut lines: Vec<ContourLine> = Vec::new();
    for p in crossings {
        let mut best: Option<(usize, f64)> = None;
        for (i, line) in lines.iter().enumerate() {
            let Some(tail) = line.points.last() else {
                continue;
            };
            let d2 = (tail[0] - p[0]).powi(2) + (tail[1] - p[1]).powi(2);
            if d2 <= max_d2 && best.map(|(_, bd2)| d2 < bd2).unwrap_or(true) {
                best = Some((i, d2));
            }
        }
        match best {
            Some((i, _)) => lines[i].points.push(p),
            None => lines.push(ContourLine {
                level,
                points: vec![p],
            }),
        }
    }
    lines.retain(|l| l.points.len() >= 2);
    lines
}

pub fn trace_contours(grid: &Grid<f64>, levels: &[f64]) -> Vec<ContourLine> {
    levels
        .iter()
        .flat_map(|&level| chain(level, level_crossings(grid, level)))
        .collect()
}
