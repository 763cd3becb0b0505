use std::fmt;

use foundation::Grid;
use serde::Serialize;

use super::edge::vertical_window;
use crate::analysis::RunningStats;
use crate::params::AttributeParams;

#[derive(Debug, Clone, PartialEq)]
pub struct RmsResult {
    pub grid: Grid<f32>,
    pub average: f64,
    pub maximum: f64,
    pub window_size: usize,
}

/// Root-mean-square amplitude over a vertical window centred on each row.
/// Same shape as the input; the window is clipped at the top and bottom.
pub fn rms_amplitude(grid: &Grid<f32>, window_size: usize) -> RmsResult {
    let (w, h) = (grid.width(), grid.height());
    let mut stats = RunningStats::default();
    let out = Grid::from_fn(w, h, |x, y| {
        let (start, end) = vertical_window(y, h, window_size);
        let mut sum_sq = 0.0f64;
        for wy in start..=end {
            let a = f64::from(grid[(x, wy)]);
            sum_sq += a * a;
        }
        let rms = (sum_sq / (end - start + 1) as f64).sqrt();
        stats.record(rms);
        rms as f32
    });
    RmsResult {
        grid: out,
        average: stats.mean(),
        maximum: if stats.count == 0 { 0.0 } else { stats.max },
        window_size,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Contrast {
    High,
    Medium,
    Low,
}

impl Contrast {
    pub fn classify(peak_abs: f64) -> Self {
        if peak_abs > 100.0 {
            Contrast::High
        } else if peak_abs > 50.0 {
            Contrast::Medium
        } else {
            Contrast::Low
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Polarity::Positive => "Positive",
            Polarity::Negative => "Negative",
        })
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Contrast::High => "High",
            Contrast::Medium => "Medium",
            Contrast::Low => "Low",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaxMagnitudeResult {
    /// Signed amplitude with the greatest magnitude in each window.
    pub grid: Grid<f32>,
    /// Absolute value of the strongest windowed amplitude.
    pub peak_amplitude: f64,
    pub peak_trace: usize,
    pub peak_sample: usize,
    /// `peak_sample * sample_rate_ms`.
    pub peak_depth: f64,
    pub polarity: Polarity,
    pub contrast: Contrast,
}

pub fn max_magnitude(grid: &Grid<f32>, params: &AttributeParams) -> MaxMagnitudeResult {
    let (w, h) = (grid.width(), grid.height());
    let mut peak = (0.0f32, 0usize, 0usize);
    let mut positive = 0usize;
    let mut negative = 0usize;

    let out = Grid::from_fn(w, h, |x, y| {
        let (start, end) = vertical_window(y, h, params.window_size);
        let mut best = grid[(x, start)];
        for wy in start + 1..=end {
            let a = grid[(x, wy)];
            if a.abs() > best.abs() {
                best = a;
            }
        }
        if best.abs() > peak.0 {
            peak = (best.abs(), x, y);
        }
        if best > 0.0 {
            positive += 1;
        } else if best < 0.0 {
            negative += 1;
        }
        best
    });

    let peak_amplitude = f64::from(peak.0);
    MaxMagnitudeResult {
        grid: out,
        peak_amplitude,
        peak_trace: peak.1,
        peak_sample: peak.2,
        peak_depth: peak.2 as f64 * params.sample_rate_ms,
        polarity: if positive > negative {
            Polarity::Positive
        } else {
            Polarity::Negative
        },
        contrast: Contrast::classify(peak_amplitude),
    }
}

#[cfg(test)]
mod tests {
    use super::{Contrast, Polarity, max_magnitude, rms_amplitude};
    use crate::params::AttributeParams;
    use foundation::Grid;

    #[test]
    fn rms_of_zero_grid_is_zero() {
        let r = rms_amplitude(&Grid::zeros(7, 30), 25);
        assert!(r.grid.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!((r.average, r.maximum), (0.0, 0.0));
    }

    #[test]
    fn rms_is_non_negative_and_same_shape() {
        let g = Grid::from_fn(9, 40, |x, y| ((x * 7 + y * 3) % 11) as f32 - 5.0);
        let r = rms_amplitude(&g, 5);
        assert_eq!((r.grid.width(), r.grid.height()), (9, 40));
        assert!(r.grid.as_slice().iter().all(|&v| v >= 0.0));
        assert!(r.maximum >= r.average);
    }

    #[test]
    fn wider_window_dilutes_isolated_spike() {
        let mut g = Grid::zeros(1, 101);
        g.set(0, 50, 10.0f32);
        let mut last = f32::INFINITY;
        for window in [1, 3, 5, 11, 25, 51] {
            let peak = rms_amplitude(&g, window).grid[(0, 50)];
            assert!(peak < last || window == 1, "window {window}: {peak} vs {last}");
            last = peak;
        }
        assert_eq!(rms_amplitude(&g, 1).grid[(0, 50)], 10.0);
    }

    #[test]
    fn max_magnitude_keeps_sign_and_locates_peak() {
        let mut g = Grid::zeros(3, 20);
        g.set(1, 10, -120.0f32);
        g.set(2, 4, 30.0);
        let p = AttributeParams::default().with_window_size(5);
        let r = max_magnitude(&g, &p);
        assert_eq!(r.grid[(1, 10)], -120.0);
        assert_eq!(r.grid[(1, 12)], -120.0);
        assert_eq!(r.grid[(1, 13)], 0.0);
        assert_eq!((r.peak_trace, r.peak_sample), (1, 8));
        assert_eq!(r.peak_depth, 32.0);
        assert_eq!(r.peak_amplitude, 120.0);
        assert_eq!(r.contrast, Contrast::High);
        assert_eq!(r.polarity, Polarity::Negative);
    }

    #[test]
    fn all_zero_grid_reports_no_peak() {
        let r = max_magnitude(&Grid::zeros(4, 4), &AttributeParams::default());
        assert!(r.grid.as_slice().iter().all(|v| v.is_finite()));
        assert_eq!(r.peak_amplitude, 0.0);
        assert_eq!(r.contrast, Contrast::Low);
    }

    #[test]
    fn contrast_buckets() {
        assert_eq!(Contrast::classify(100.0), Contrast::Medium);
        assert_eq!(Contrast::classify(50.5), Contrast::Medium);
        assert_eq!(Contrast::classify(50.0), Contrast::Low);
        assert_eq!(Contrast::classify(100.1), Contrast::High);
    }
}
