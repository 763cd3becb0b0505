use foundation::Grid;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GeometryError;
use crate::volume::Volume;

/// Narrow slices are stretched to at least this many display columns.
pub const MIN_DISPLAY_WIDTH: usize = 1600;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    Inline,
    Crossline,
}

impl std::fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceAxis::Inline => write!(f, "Inline"),
            SliceAxis::Crossline => write!(f, "Crossline"),
        }
    }
}

impl std::str::FromStr for SliceAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" | "il" => Ok(SliceAxis::Inline),
            "crossline" | "xl" => Ok(SliceAxis::Crossline),
            other => Err(format!("unknown slice axis: {other}")),
        }
    }
}

/// A vertical section cut from a volume at a fixed line.
///
/// `data` is `width x height` with rows as time samples and columns as
/// traces. It is an owned copy: nothing done to a slice reaches the volume.
/// `display_width`/`display_height` only scale presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub axis: SliceAxis,
    pub line_number: i32,
    pub data: Grid<f32>,
    pub direction: String,
    pub azimuth: f64,
    pub sample_rate_ms: f64,
    pub display_width: usize,
    pub display_height: usize,
}

impl Slice {
    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Display name, e.g. `Inline_1225`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.axis, self.line_number)
    }
}

/// Extracts the slice at `line_number`, or `None` when the line is outside
/// the volume. Callers must not advance their current line on `None`.
pub fn extract_slice(volume: &Volume, axis: SliceAxis, line_number: i32) -> Option<Slice> {
    match extract_slice_checked(volume, axis, line_number) {
        Ok(slice) => Some(slice),
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

/// Like [`extract_slice`], but says why a line could not be extracted.
pub fn extract_slice_checked(
    volume: &Volume,
    axis: SliceAxis,
    line_number: i32,
) -> Result<Slice, GeometryError> {
    let dims = volume.dims();
    let geometry = volume.geometry();
    let height = dims.num_samples;

    let (data, direction, azimuth) = match axis {
        SliceAxis::Inline => {
            let il = dims
                .inline_index(line_number)
                .ok_or_else(|| out_of_range(axis, line_number, dims.inline_range()))?;
            let data = Grid::from_fn(dims.num_crosslines, height, |xl, t| {
                volume.trace(il, xl)[t]
            });
            (
                data,
                geometry.inline_direction.clone(),
                geometry.inline_azimuth,
            )
        }
        SliceAxis::Crossline => {
            let xl = dims
                .crossline_index(line_number)
                .ok_or_else(|| out_of_range(axis, line_number, dims.crossline_range()))?;
            let data = Grid::from_fn(dims.num_inlines, height, |il, t| volume.trace(il, xl)[t]);
            (
                data,
                geometry.crossline_direction.clone(),
                geometry.crossline_azimuth,
            )
        }
    };

    Ok(Slice {
        axis,
        line_number,
        display_width: data.width().max(MIN_DISPLAY_WIDTH),
        display_height: height,
        data,
        direction,
        azimuth,
        sample_rate_ms: volume.sample_rate_ms(),
    })
}

fn out_of_range(axis: SliceAxis, line: i32, (start, end): (i32, i32)) -> GeometryError {
    GeometryError::LineOutOfRange {
        axis,
        line,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{SurveyGeometry, VolumeDims};

    fn ramp_volume(dims: VolumeDims) -> Volume {
        let samples = (0..dims.len()).map(|i| i as f32).collect();
        Volume::new(dims, 4.0, SurveyGeometry::default(), samples).expect("volume")
    }

    #[test]
    fn inline_slices_reassemble_the_volume() {
        let dims = VolumeDims::new(4, 3, 5);
        let volume = ramp_volume(dims);

        for il in 0..dims.num_inlines {
            let slice = extract_slice(&volume, SliceAxis::Inline, dims.inline_start + il as i32)
                .expect("in range");
            assert_eq!(slice.width(), 3);
            assert_eq!(slice.height(), 5);
            for xl in 0..dims.num_crosslines {
                for t in 0..dims.num_samples {
                    assert_eq!(slice.data[(xl, t)], volume.trace(il, xl)[t]);
                }
            }
        }

        assert!(extract_slice(&volume, SliceAxis::Inline, dims.inline_start - 1).is_none());
        assert!(extract_slice(&volume, SliceAxis::Inline, dims.inline_start + 4).is_none());
    }

    #[test]
    fn crossline_slice_transposes_inlines() {
        let dims = VolumeDims::new(4, 3, 5);
        let volume = ramp_volume(dims);
        let slice = extract_slice(&volume, SliceAxis::Crossline, 2001).expect("in range");
        assert_eq!(slice.width(), 4);
        assert_eq!(slice.height(), 5);
        assert_eq!(slice.data[(3, 2)], volume.trace(3, 1)[2]);
        assert_eq!(slice.direction, "SE-NW");
        assert_eq!(slice.azimuth, 135.0);
        assert_eq!(slice.name(), "Crossline_2001");
        assert!(extract_slice(&volume, SliceAxis::Crossline, 2003).is_none());
    }

    #[test]
    fn survey_sized_slice_and_display_scaling() {
        let dims = VolumeDims::new(50, 50, 600);
        let volume = Volume::zeros(dims, 4.0, SurveyGeometry::default());

        let slice = extract_slice(&volume, SliceAxis::Inline, 1225).expect("in range");
        assert_eq!((slice.width(), slice.height()), (50, 600));
        assert_eq!(slice.display_width, MIN_DISPLAY_WIDTH);
        assert_eq!(slice.display_height, 600);
        assert_eq!(slice.direction, "NE-SW");
        assert_eq!(slice.azimuth, 45.0);

        assert!(extract_slice(&volume, SliceAxis::Inline, 1260).is_none());
        let err = extract_slice_checked(&volume, SliceAxis::Inline, 1400).unwrap_err();
        assert_eq!(err.to_string(), "Inline 1400 out of range [1200,1249]");
    }

    #[test]
    fn axis_parses_from_cli_text() {
        assert_eq!("inline".parse::<SliceAxis>(), Ok(SliceAxis::Inline));
        assert_eq!("XL".parse::<SliceAxis>(), Ok(SliceAxis::Crossline));
        assert!("time".parse::<SliceAxis>().is_err());
    }
}
