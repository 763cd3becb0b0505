use formats::segy::{BinaryHeader, SegyFile, Trace, TraceHeader};
use tracing::{debug, warn};

use crate::error::GeometryError;
use crate::geometry::{SurveyGeometry, VolumeDims};

/// Sample rate assumed when a SEG-Y binary header leaves the interval at zero.
pub const DEFAULT_SAMPLE_RATE_MS: f64 = 4.0;

/// An inferred grid may hold at most this many cells per trace.
pub const MAX_CELLS_PER_TRACE: usize = 64;

/// Dense amplitude volume addressed by `(inline index, crossline index, sample)`.
///
/// Samples are stored trace-contiguous: the trace at `(il, xl)` occupies
/// `[(il * num_crosslines + xl) * num_samples ..][..num_samples]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    dims: VolumeDims,
    sample_rate_ms: f64,
    geometry: SurveyGeometry,
    samples: Vec<f32>,
}

impl Volume {
    pub fn new(
        dims: VolumeDims,
        sample_rate_ms: f64,
        geometry: SurveyGeometry,
        samples: Vec<f32>,
    ) -> Result<Self, GeometryError> {
        if samples.len() != dims.len() {
            return Err(GeometryError::DataLength {
                expected: dims.len(),
                found: samples.len(),
            });
        }
        Ok(Self {
            dims,
            sample_rate_ms,
            geometry,
            samples,
        })
    }

    pub fn zeros(dims: VolumeDims, sample_rate_ms: f64, geometry: SurveyGeometry) -> Self {
        Self {
            dims,
            sample_rate_ms,
            geometry,
            samples: vec![0.0; dims.len()],
        }
    }

    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    pub fn num_inlines(&self) -> usize {
        self.dims.num_inlines
    }

    pub fn num_crosslines(&self) -> usize {
        self.dims.num_crosslines
    }

    pub fn num_samples(&self) -> usize {
        self.dims.num_samples
    }

    pub fn inline_start(&self) -> i32 {
        self.dims.inline_start
    }

    pub fn crossline_start(&self) -> i32 {
        self.dims.crossline_start
    }

    pub fn sample_rate_ms(&self) -> f64 {
        self.sample_rate_ms
    }

    pub fn geometry(&self) -> &SurveyGeometry {
        &self.geometry
    }

    /// `[0, num_samples * sample_rate]` in milliseconds of two-way time.
    pub fn time_range_ms(&self) -> (f64, f64) {
        (0.0, self.dims.num_samples as f64 * self.sample_rate_ms)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    fn offset(&self, il: usize, xl: usize) -> usize {
        (il * self.dims.num_crosslines + xl) * self.dims.num_samples
    }

    /// Trace at zero-based axis indices. Panics when out of bounds.
    pub fn trace(&self, il: usize, xl: usize) -> &[f32] {
        let start = self.offset(il, xl);
        &self.samples[start..start + self.dims.num_samples]
    }

    pub fn trace_mut(&mut self, il: usize, xl: usize) -> &mut [f32] {
        let start = self.offset(il, xl);
        let n = self.dims.num_samples;
        &mut self.samples[start..start + n]
    }

    pub fn get(&self, il: usize, xl: usize, t: usize) -> Option<f32> {
        if il >= self.dims.num_inlines || xl >= self.dims.num_crosslines || t >= self.dims.num_samples
        {
            return None;
        }
        Some(self.samples[self.offset(il, xl) + t])
    }

    /// Trace addressed by survey line numbers rather than indices.
    pub fn trace_at(&self, inline: i32, crossline: i32) -> Option<&[f32]> {
        let il = self.dims.inline_index(inline)?;
        let xl = self.dims.crossline_index(crossline)?;
        Some(self.trace(il, xl))
    }

    /// Lays the volume out as IEEE-float SEG-Y, inline-major, trace numbers from 1.
    pub fn to_segy(&self, text_header: impl Into<String>) -> SegyFile {
        let dims = self.dims;
        let mut traces = Vec::with_capacity(dims.num_inlines * dims.num_crosslines);
        for il in 0..dims.num_inlines {
            for xl in 0..dims.num_crosslines {
                traces.push(Trace {
                    header: TraceHeader {
                        trace_number: traces.len() as i32 + 1,
                        inline: dims.inline_start + il as i32,
                        crossline: dims.crossline_start + xl as i32,
                        num_samples: dims.num_samples.min(i16::MAX as usize) as i16,
                    },
                    samples: self.trace(il, xl).to_vec(),
                });
            }
        }
        SegyFile {
            text_header: text_header.into(),
            binary_header: BinaryHeader::ieee(traces.len(), dims.num_samples, self.sample_rate_ms),
            traces,
        }
    }
}

/// Result of laying traces onto a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledVolume {
    pub volume: Volume,
    /// Grid cells that received no trace and were left zero-filled.
    pub missing_cells: usize,
}

/// Lays a flat list of same-length traces onto an inline/crossline grid.
#[derive(Debug, Clone)]
pub struct VolumeBuilder {
    dims: VolumeDims,
    sample_rate_ms: f64,
    geometry: SurveyGeometry,
}

impl VolumeBuilder {
    pub fn new(dims: VolumeDims, sample_rate_ms: f64) -> Self {
        Self {
            dims,
            sample_rate_ms,
            geometry: SurveyGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: SurveyGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// Smallest grid that covers every trace's inline/crossline header.
    pub fn infer(traces: &[Trace], sample_rate_ms: f64) -> Result<Self, GeometryError> {
        let first = traces.first().ok_or(GeometryError::EmptySurvey)?;
        let (mut il_min, mut il_max) = (first.header.inline, first.header.inline);
        let (mut xl_min, mut xl_max) = (first.header.crossline, first.header.crossline);
        for t in traces.iter().skip(1) {
            il_min = il_min.min(t.header.inline);
            il_max = il_max.max(t.header.inline);
            xl_min = xl_min.min(t.header.crossline);
            xl_max = xl_max.max(t.header.crossline);
        }

        let dims = VolumeDims {
            num_inlines: (il_max as i64 - il_min as i64 + 1) as usize,
            num_crosslines: (xl_max as i64 - xl_min as i64 + 1) as usize,
            num_samples: first.samples.len(),
            inline_start: il_min,
            crossline_start: xl_min,
        };
        let cells = dims.num_cells();
        let too_sparse = cells
            .is_none_or(|c| c > traces.len().saturating_mul(MAX_CELLS_PER_TRACE));
        if too_sparse || dims.checked_len().is_none() {
            return Err(GeometryError::GridTooLarge {
                cells,
                traces: traces.len(),
            });
        }
        Ok(Self::new(dims, sample_rate_ms))
    }

    /// Infers the grid from a decoded SEG-Y file and assembles its traces.
    pub fn from_segy(file: SegyFile) -> Result<AssembledVolume, GeometryError> {
        let rate = match file.binary_header.sample_interval_ms() {
            r if r > 0.0 => r,
            _ => DEFAULT_SAMPLE_RATE_MS,
        };
        Self::infer(&file.traces, rate)?.build(file.traces)
    }

    /// Lays the traces into a volume.
    ///
    /// Cells with no trace stay zero-filled and are counted in
    /// `missing_cells`; the grid never shifts to close gaps.
    pub fn build(&self, traces: Vec<Trace>) -> Result<AssembledVolume, GeometryError> {
        self.build_from(&traces)
    }

    /// Like [`VolumeBuilder::build`] but leaves the traces with the caller.
    pub fn build_from(&self, traces: &[Trace]) -> Result<AssembledVolume, GeometryError> {
        if traces.is_empty() {
            return Err(GeometryError::EmptySurvey);
        }

        let dims = self.dims;
        if dims.checked_len().is_none() {
            return Err(GeometryError::GridTooLarge {
                cells: dims.num_cells(),
                traces: traces.len(),
            });
        }
        let mut volume = Volume::zeros(dims, self.sample_rate_ms, self.geometry.clone());
        let mut filled = vec![false; dims.num_inlines * dims.num_crosslines];

        for (trace_index, trace) in traces.iter().enumerate() {
            if trace.samples.len() != dims.num_samples {
                return Err(GeometryError::SampleCountMismatch {
                    trace_index,
                    expected: dims.num_samples,
                    found: trace.samples.len(),
                });
            }

            let (inline, crossline) = (trace.header.inline, trace.header.crossline);
            let (Some(il), Some(xl)) = (dims.inline_index(inline), dims.crossline_index(crossline))
            else {
                return Err(GeometryError::TraceOutOfRange {
                    trace_index,
                    inline,
                    crossline,
                    inline_range: dims.inline_range(),
                    crossline_range: dims.crossline_range(),
                });
            };

            let cell = il * dims.num_crosslines + xl;
            if filled[cell] {
                return Err(GeometryError::DuplicateTrace { inline, crossline });
            }
            filled[cell] = true;
            volume.trace_mut(il, xl).copy_from_slice(&trace.samples);
        }

        let missing_cells = filled.iter().filter(|f| !**f).count();
        if missing_cells > 0 {
            warn!(missing_cells, "volume has grid cells without traces; zero-filled");
        }
        debug!(
            inlines = dims.num_inlines,
            crosslines = dims.num_crosslines,
            samples = dims.num_samples,
            "assembled volume"
        );

        Ok(AssembledVolume {
            volume,
            missing_cells,
        })
    }
}
