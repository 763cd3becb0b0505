use formats::segy::{BinaryHeader, SegyFile, Trace, TraceHeader};
use foundation::Grid;

use tracing::info;

use crate::error::GeometryError;
use crate::geometry::{SurveyGeometry, VolumeDims};
use crate::slice::MIN_DISPLAY_WIDTH;
use crate::volume::{AssembledVolume, DEFAULT_SAMPLE_RATE_MS, Volume, VolumeBuilder};

/// A standalone 2-D seismic line (traces as columns, samples as rows),
/// e.g. a single-line SEG-Y import or a synthetic demo line.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub data: Grid<f32>,
    pub sample_rate_ms: f64,
    pub display_width: usize,
    pub display_height: usize,
}

impl Section {
    /// Traces beyond this count are dropped on import.
    pub const DEFAULT_MAX_TRACES: usize = 1000;

    pub fn new(name: impl Into<String>, data: Grid<f32>, sample_rate_ms: f64) -> Self {
        Self {
            name: name.into(),
            display_width: data.width().max(MIN_DISPLAY_WIDTH),
            display_height: data.height(),
            data,
            sample_rate_ms,
        }
    }

    /// Lays traces side by side. The section is as tall as the first trace;
    /// shorter traces are zero-padded and longer ones cut.
    pub fn from_traces(
        name: impl Into<String>,
        traces: &[Trace],
        max_traces: usize,
        sample_rate_ms: f64,
    ) -> Result<Self, GeometryError> {
        let first = traces.first().ok_or(GeometryError::EmptySurvey)?;
        let height = first.samples.len();
        let width = traces.len().min(max_traces);
        let data = Grid::from_fn(width, height, |x, y| {
            traces[x].samples.get(y).copied().unwrap_or(0.0)
        });
        Ok(Self::new(name, data, sample_rate_ms))
    }

    /// Two-way time of the last sample row, in milliseconds.
    pub fn time_range_ms(&self) -> (f64, f64) {
        (0.0, self.data.height() as f64 * self.sample_rate_ms)
    }

    /// The line as a single-inline volume (inline 1, crosslines from 1), so
    /// it can be navigated and sliced like a 3-D survey.
    pub fn to_volume(&self) -> Result<Volume, GeometryError> {
        let (width, height) = (self.data.width(), self.data.height());
        let dims = VolumeDims::new(1, width, height).with_starts(1, 1);
        let mut samples = Vec::with_capacity(width * height);
        for x in 0..width {
            samples.extend((0..height).map(|y| self.data.get(x, y).unwrap_or(0.0)));
        }
        Volume::new(dims, self.sample_rate_ms, SurveyGeometry::default(), samples)
    }

    /// Writes the line as IEEE-float SEG-Y: one trace per column, inline 1,
    /// crosslines numbered from 1.
    pub fn to_segy(&self, text_header: impl Into<String>) -> SegyFile {
        let (width, height) = (self.data.width(), self.data.height());
        let traces: Vec<Trace> = (0..width)
            .map(|x| Trace {
                header: TraceHeader {
                    trace_number: x as i32 + 1,
                    inline: 1,
                    crossline: x as i32 + 1,
                    num_samples: height.min(i16::MAX as usize) as i16,
                },
                samples: (0..height)
                    .map(|y| self.data.get(x, y).unwrap_or(0.0))
                    .collect(),
            })
            .collect();
        SegyFile {
            text_header: text_header.into(),
            binary_header: BinaryHeader::ieee(traces.len(), height, self.sample_rate_ms),
            traces,
        }
    }
}

/// What a SEG-Y file turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum SegyImport {
    Volume(AssembledVolume),
    /// Headers did not give each trace its own inline/crossline cell, so
    /// traces were laid side by side in file order.
    Line(Section),
}

impl SegyImport {
    /// Assembles a volume from trace headers. Files whose headers repeat a
    /// position (typically single-line exports with zeroed inline/crossline
    /// fields) are imported as a 2-D section of at most
    /// [`Section::DEFAULT_MAX_TRACES`] traces instead.
    pub fn from_segy(file: SegyFile, name: impl Into<String>) -> Result<Self, GeometryError> {
        let rate = match file.binary_header.sample_interval_ms() {
            r if r > 0.0 => r,
            _ => DEFAULT_SAMPLE_RATE_MS,
        };
        match VolumeBuilder::infer(&file.traces, rate)?.build_from(&file.traces) {
            Ok(assembled) => return Ok(SegyImport::Volume(assembled)),
            Err(GeometryError::DuplicateTrace { inline, crossline }) => {
                info!(inline, crossline, "repeated trace position; importing as a 2-D line");
            }
            Err(err) => return Err(err),
        }
        Section::from_traces(name, &file.traces, Section::DEFAULT_MAX_TRACES, rate)
            .map(SegyImport::Line)
    }

    /// The navigable volume: the assembled survey, or the line as one inline.
    pub fn into_assembled(self) -> Result<AssembledVolume, GeometryError> {
        match self {
            SegyImport::Volume(assembled) => Ok(assembled),
            SegyImport::Line(section) => Ok(AssembledVolume {
                volume: section.to_volume()?,
                missing_cells: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SegyImport, Section};
    use crate::error::GeometryError;
    use formats::segy::{BinaryHeader, SegyFile, Trace, TraceHeader, encode_segy};

    fn trace(samples: Vec<f32>) -> Trace {
        Trace {
            header: TraceHeader::default(),
            samples,
        }
    }

    #[test]
    fn traces_become_columns() {
        let traces = vec![trace(vec![1.0, 2.0, 3.0]), trace(vec![4.0, 5.0])];
        let s = Section::from_traces("line", &traces, 1000, 4.0).expect("section");
        assert_eq!((s.data.width(), s.data.height()), (2, 3));
        assert_eq!(s.data.row(0), &[1.0, 4.0]);
        assert_eq!(s.data.row(2), &[3.0, 0.0]);
        assert_eq!(s.time_range_ms(), (0.0, 12.0));
        assert_eq!(s.display_width, 1600);
    }

    #[test]
    fn line_exports_one_trace_per_column() {
        let traces = vec![trace(vec![1.0, 2.0]), trace(vec![3.0, 4.0]), trace(vec![5.0, 6.0])];
        let s = Section::from_traces("line", &traces, 1000, 2.0).expect("section");
        let segy = s.to_segy("demo");
        assert_eq!(segy.traces.len(), 3);
        assert_eq!(segy.traces[2].samples, vec![5.0, 6.0]);
        assert_eq!(segy.traces[2].header.crossline, 3);
        assert_eq!(segy.binary_header.sample_interval_ms(), 2.0);
        let back = Section::from_traces("line", &segy.traces, 1000, 2.0).expect("section");
        assert_eq!(back.data, s.data);
    }

    fn zeroed_header_file(n: usize) -> SegyFile {
        SegyFile {
            text_header: String::new(),
            binary_header: BinaryHeader::ieee(n, 2, 2.0),
            traces: (0..n).map(|i| trace(vec![i as f32, -(i as f32)])).collect(),
        }
    }

    #[test]
    fn zeroed_headers_import_as_a_line() {
        let bytes = encode_segy(&zeroed_header_file(4)).expect("encode");
        let file = SegyFile::from_bytes(&bytes).expect("decode");
        let import = SegyImport::from_segy(file, "L5").expect("import");
        let SegyImport::Line(section) = &import else {
            panic!("expected a line, got {import:?}");
        };
        assert_eq!(section.name, "L5");
        assert_eq!((section.data.width(), section.data.height()), (4, 2));
        assert_eq!(section.data.row(0), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(section.sample_rate_ms, 2.0);

        let volume = import.into_assembled().expect("volume").volume;
        assert_eq!(volume.dims().inline_range(), (1, 1));
        assert_eq!(volume.dims().crossline_range(), (1, 4));
        assert_eq!(volume.trace_at(1, 3), Some(&[2.0, -2.0][..]));
    }

    #[test]
    fn line_import_is_capped() {
        let file = zeroed_header_file(Section::DEFAULT_MAX_TRACES + 5);
        match SegyImport::from_segy(file, "long").expect("import") {
            SegyImport::Line(section) => {
                assert_eq!(section.data.width(), Section::DEFAULT_MAX_TRACES)
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn numbered_headers_still_assemble_a_volume() {
        let mut file = zeroed_header_file(4);
        for (i, t) in file.traces.iter_mut().enumerate() {
            t.header.inline = 10 + i as i32 / 2;
            t.header.crossline = 20 + i as i32 % 2;
        }
        match SegyImport::from_segy(file, "3d").expect("import") {
            SegyImport::Volume(assembled) => {
                assert_eq!(assembled.volume.dims().inline_range(), (10, 11))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn caps_trace_count() {
        let traces: Vec<Trace> = (0..5).map(|i| trace(vec![i as f32])).collect();
        let s = Section::from_traces("line", &traces, 3, 4.0).expect("section");
        assert_eq!(s.data.width(), 3);
        assert_eq!(
            Section::from_traces("empty", &[], 3, 4.0),
            Err(GeometryError::EmptySurvey)
        );
    }
}
