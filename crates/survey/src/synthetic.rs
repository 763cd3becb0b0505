//! Procedural survey generation for demos and tests.
//!
//! Both generators are seeded: the same parameters give the same amplitudes.

use foundation::Grid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{SurveyGeometry, VolumeDims};
use crate::section::Section;
use crate::volume::Volume;

/// Reflector skeleton is laid out for this many samples and scaled to the
/// requested trace length.
const REFERENCE_SAMPLES: f64 = 600.0;
/// Reflector pulses are drawn only within this many samples of the horizon.
const PULSE_SUPPORT: f64 = 3.0;

/// Parameters of the synthetic 3-D volume.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSurvey {
    pub dims: VolumeDims,
    pub sample_rate_ms: f64,
    pub geometry: SurveyGeometry,
    pub seed: u64,
    /// Scales every random term (background noise, spikes, fault-zone scatter).
    pub noise_level: f32,
    /// Downthrow in samples on the far side of the inline-direction fault.
    pub inline_fault_throw: f64,
    /// Downthrow in samples on the far side of the crossline-direction fault.
    pub crossline_fault_throw: f64,
}

impl Default for SyntheticSurvey {
    fn default() -> Self {
        Self {
            dims: VolumeDims::new(50, 50, 600),
            sample_rate_ms: 4.0,
            geometry: SurveyGeometry::default(),
            seed: 0,
            noise_level: 1.0,
            inline_fault_throw: 12.0,
            crossline_fault_throw: 8.0,
        }
    }
}

/// Number of reflectors in the 3-D skeleton.
pub const NUM_REFLECTORS: usize = 3;

impl SyntheticSurvey {
    pub fn with_dims(mut self, dims: VolumeDims) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn fault_inline(&self) -> f64 {
        self.dims.num_inlines as f64 * 0.4
    }

    fn fault_crossline(&self) -> f64 {
        self.dims.num_crosslines as f64 * 0.6
    }

    /// Vertical shift applied to everything below the fault planes.
    pub fn fault_offset(&self, il: usize, xl: usize) -> f64 {
        let mut offset = 0.0;
        if il as f64 > self.fault_inline() {
            offset += self.inline_fault_throw;
        }
        if xl as f64 > self.fault_crossline() {
            offset += self.crossline_fault_throw;
        }
        offset
    }

    fn in_fault_zone(&self, il: usize, xl: usize) -> bool {
        (il as f64 - self.fault_inline()).abs() < 2.0
            || (xl as f64 - self.fault_crossline()).abs() < 2.0
    }

    /// Unfaulted depth (in samples) of reflector `layer` at the given trace.
    pub fn reflector_depth(&self, layer: usize, il: usize, xl: usize) -> f64 {
        let (il, xl) = (il as f64, xl as f64);
        let scale = self.dims.num_samples as f64 / REFERENCE_SAMPLES;
        let depth = match layer {
            // gently dipping
            0 => 100.0 + (xl / 8.0).sin() * 25.0 + (il / 10.0).cos() * 20.0,
            // folded
            1 => {
                250.0
                    + (xl / 10.0).cos() * 40.0
                    + (il / 8.0).sin() * 30.0
                    + ((il + xl) / 15.0).sin() * 15.0
            }
            // anticline
            _ => {
                420.0 + (xl / 12.0).sin() * 30.0
                    - (il - self.dims.num_inlines as f64 / 2.0).abs() * 0.5
            }
        };
        depth * scale
    }

    fn reflector_amplitude(layer: usize) -> f64 {
        match layer {
            0 => 80.0,
            1 => 60.0,
            _ => 70.0,
        }
    }

    pub fn generate(&self) -> Volume {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let dims = self.dims;
        let noise = self.noise_level as f64;
        let mut volume = Volume::zeros(dims, self.sample_rate_ms, self.geometry.clone());

        for il in 0..dims.num_inlines {
            for xl in 0..dims.num_crosslines {
                let offset = self.fault_offset(il, xl);
                let depths: [f64; NUM_REFLECTORS] =
                    std::array::from_fn(|layer| self.reflector_depth(layer, il, xl));
                let fault_zone = self.in_fault_zone(il, xl);
                let trace = volume.trace_mut(il, xl);

                for (t, sample) in trace.iter_mut().enumerate() {
                    // Faulting moves the whole column, so reflectors shift rather than vanish.
                    let local_t = t as f64 - offset;
                    let mut amplitude = 0.0;

                    for (layer, depth) in depths.iter().enumerate() {
                        let d = local_t - depth;
                        if d.abs() < PULSE_SUPPORT {
                            amplitude +=
                                Self::reflector_amplitude(layer) * (-(d / 2.0).powi(2)).exp();
                        }
                    }

                    amplitude += (local_t / 25.0).sin() * 15.0;
                    amplitude += (local_t / 40.0 + il as f64 / 20.0 + xl as f64 / 20.0).cos() * 20.0;

                    if fault_zone {
                        amplitude += noise * rng.gen_range(-0.5..0.5) * 80.0;
                    }
                    amplitude += noise * rng.gen_range(-0.5..0.5) * 12.0;
                    if rng.gen_bool(0.015) {
                        amplitude += noise * rng.gen_range(-0.5..0.5) * 40.0;
                    }

                    *sample = amplitude as f32;
                }
            }
        }

        volume
    }
}

struct LineHorizon {
    depth: f64,
    amplitude: f64,
    dip: f64,
}

struct LineFault {
    x: f64,
    displacement: f64,
    width: f64,
}

/// Parameters of the synthetic 2-D PSTM line.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticLine {
    pub width: usize,
    pub height: usize,
    pub sample_rate_ms: f64,
    /// Dominant frequency of the Ricker wavelet, Hz.
    pub dominant_frequency: f64,
    pub seed: u64,
    pub noise_level: f32,
}

impl Default for SyntheticLine {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            sample_rate_ms: 4.0,
            dominant_frequency: 25.0,
            seed: 0,
            noise_level: 1.0,
        }
    }
}

const LINE_HORIZONS: [LineHorizon; 5] = [
    LineHorizon {
        depth: 120.0,
        amplitude: 95.0,
        dip: 0.008,
    },
    LineHorizon {
        depth: 280.0,
        amplitude: 75.0,
        dip: -0.005,
    },
    LineHorizon {
        depth: 380.0,
        amplitude: 85.0,
        dip: -0.003,
    },
    LineHorizon {
        depth: 520.0,
        amplitude: 70.0,
        dip: 0.004,
    },
    LineHorizon {
        depth: 650.0,
        amplitude: 60.0,
        dip: 0.002,
    },
];

const LINE_FAULTS: [LineFault; 3] = [
    LineFault {
        x: 320.0,
        displacement: 25.0,
        width: 15.0,
    },
    LineFault {
        x: 680.0,
        displacement: 35.0,
        width: 20.0,
    },
    LineFault {
        x: 950.0,
        displacement: 18.0,
        width: 12.0,
    },
];

/// Ricker wavelet at `t` seconds for a dominant frequency `f` Hz.
pub fn ricker(t: f64, f: f64) -> f64 {
    let a = (std::f64::consts::PI * f * t).powi(2);
    (1.0 - 2.0 * a) * (-a).exp()
}

impl SyntheticLine {
    /// Horizontal positions are laid out for a 1200-trace line and scaled.
    fn x_scale(&self) -> f64 {
        self.width as f64 / 1200.0
    }

    /// Downthrow (in samples) at trace `x`. Each fault displaces only inside
    /// its zone `(f.x, f.x + width)`, tapering linearly from the full throw
    /// at the fault plane to zero at the zone edge.
    pub fn fault_offset(&self, x: usize) -> f64 {
        let x = x as f64 / self.x_scale();
        LINE_FAULTS
            .iter()
            .filter(|f| x > f.x && x < f.x + f.width)
            .map(|f| f.displacement * (1.0 - (x - f.x) / f.width))
            .sum()
    }

    pub fn generate(&self) -> Section {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = self.noise_level as f64;
        let depth_scale = self.height as f64 / 800.0;
        let x_scale = self.x_scale();

        let data = Grid::from_fn(self.width, self.height, |x, y| {
            let xf = x as f64;
            let yf = y as f64;
            let x_ref = xf / x_scale;
            let mut amplitude = 0.0;

            for fault in &LINE_FAULTS {
                if x_ref > fault.x && x_ref - fault.x < fault.width {
                    amplitude += noise * rng.gen_range(-0.5..0.5) * 80.0;
                }
            }
            let offset = self.fault_offset(x) * depth_scale;

            for h in &LINE_HORIZONS {
                let depth = (h.depth + h.dip * x_ref) * depth_scale + offset;
                let d = yf - depth;
                if d.abs() < 10.0 {
                    let t = d * self.sample_rate_ms / 1000.0;
                    amplitude += h.amplitude * ricker(t, self.dominant_frequency);
                }
            }

            amplitude += (yf / 30.0 + xf / 400.0).sin() * 18.0;
            amplitude += (yf / 45.0).cos() * 12.0;
            amplitude += noise * rng.gen_range(-0.5..0.5) * 15.0;
            amplitude += ((xf + yf * 2.5) / 25.0).sin() * 8.0;
            if yf > 240.0 {
                amplitude += ((yf - 240.0) / 60.0).sin() * (xf / 100.0).cos() * 10.0;
            }

            // amplitude decays with depth
            (amplitude * (-yf / 1200.0).exp()) as f32
        });

        Section::new("Line_L5_PSTM_UnEnh", data, self.sample_rate_ms)
    }
}

/// Convenience for the default 2-D demo line.
pub fn pstm_line(seed: u64) -> Section {
    SyntheticLine {
        seed,
        ..SyntheticLine::default()
    }
    .generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticSurvey {
        SyntheticSurvey::default().with_dims(VolumeDims::new(10, 10, 120))
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = small().with_seed(7).generate();
        let b = small().with_seed(7).generate();
        let c = small().with_seed(8).generate();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn amplitudes_stay_bounded() {
        let v = SyntheticSurvey::default().with_seed(3).generate();
        assert_eq!(v.as_slice().len(), 50 * 50 * 600);
        assert!(v.as_slice().iter().all(|a| a.is_finite() && a.abs() < 500.0));
    }

    #[test]
    fn fault_throw_shifts_reflectors_instead_of_removing_them() {
        let mut unfaulted = small();
        unfaulted.noise_level = 0.0;
        unfaulted.inline_fault_throw = 0.0;
        unfaulted.crossline_fault_throw = 0.0;
        let mut faulted = unfaulted.clone();
        faulted.inline_fault_throw = 12.0;

        let a = unfaulted.generate();
        let b = faulted.generate();

        // inline index 8 lies past the fault at 0.4 * 10; crossline 0 is before its fault.
        assert_eq!(faulted.fault_offset(8, 0), 12.0);
        let before = a.trace(8, 0);
        let after = b.trace(8, 0);
        for t in 12..before.len() {
            assert_eq!(after[t], before[t - 12]);
        }
        let peak = after.iter().fold(0.0f32, |m, v| m.max(*v));
        assert!(peak > 50.0);

        // upthrown side is untouched
        assert_eq!(a.trace(1, 0), b.trace(1, 0));
    }

    #[test]
    fn reflector_depth_scales_with_trace_length() {
        let s = small();
        let full = SyntheticSurvey::default();
        let ratio = s.reflector_depth(2, 3, 4) / full.reflector_depth(2, 3, 4);
        assert!((ratio - 120.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn ricker_peaks_at_zero() {
        assert_eq!(ricker(0.0, 25.0), 1.0);
        assert!(ricker(0.02, 25.0) < 0.0);
    }

    #[test]
    fn pstm_line_has_declared_shape() {
        let line = SyntheticLine {
            width: 120,
            height: 80,
            ..SyntheticLine::default()
        }
        .generate();
        assert_eq!(line.data.width(), 120);
        assert_eq!(line.data.height(), 80);
        assert!(line.data.as_slice().iter().all(|a| a.is_finite()));

        let line2 = SyntheticLine {
            width: 1200,
            ..SyntheticLine::default()
        };
        assert_eq!(line2.fault_offset(100), 0.0);
        assert_eq!(line2.fault_offset(700), 0.0);
        assert_eq!(line2.fault_offset(1100), 0.0);
    }

    #[test]
    fn line_fault_throw_tapers_inside_its_zone() {
        let line = SyntheticLine::default();
        // At the fault plane itself nothing is displaced yet.
        assert_eq!(line.fault_offset(320), 0.0);
        assert!((line.fault_offset(325) - 25.0 * (1.0 - 5.0 / 15.0)).abs() < 1e-9);
        assert_eq!(line.fault_offset(690), 17.5);
        assert!(line.fault_offset(681) > line.fault_offset(699));
        assert_eq!(line.fault_offset(335), 0.0);
    }
}
