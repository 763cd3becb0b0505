use serde::{Deserialize, Serialize};

/// Acquisition layout of a 3-D survey.
///
/// Azimuths are degrees clockwise from north. Slices inherit the azimuth and
/// direction label of the axis they are cut along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyGeometry {
    pub inline_azimuth: f64,
    pub crossline_azimuth: f64,
    pub inline_direction: String,
    pub crossline_direction: String,
    /// Trace spacing in metres.
    pub bin_spacing: f64,
    #[serde(default)]
    pub survey_name: String,
    #[serde(default)]
    pub area: String,
}

impl Default for SurveyGeometry {
    fn default() -> Self {
        Self {
            inline_azimuth: 45.0,
            crossline_azimuth: 135.0,
            inline_direction: "NE-SW".to_string(),
            crossline_direction: "SE-NW".to_string(),
            bin_spacing: 25.0,
            survey_name: "Demo 3D Survey".to_string(),
            area: "Synthetic Basin".to_string(),
        }
    }
}

/// Extents of a volume along its three axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDims {
    pub num_inlines: usize,
    pub num_crosslines: usize,
    pub num_samples: usize,
    pub inline_start: i32,
    pub crossline_start: i32,
}

impl VolumeDims {
    pub fn new(num_inlines: usize, num_crosslines: usize, num_samples: usize) -> Self {
        Self {
            num_inlines,
            num_crosslines,
            num_samples,
            inline_start: 1200,
            crossline_start: 2000,
        }
    }

    pub fn with_starts(mut self, inline_start: i32, crossline_start: i32) -> Self {
        self.inline_start = inline_start;
        self.crossline_start = crossline_start;
        self
    }

    /// Total sample count, saturating at `usize::MAX`. Use
    /// [`VolumeDims::checked_len`] before allocating.
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    pub fn checked_len(&self) -> Option<usize> {
        self.num_cells()?.checked_mul(self.num_samples)
    }

    /// Number of inline/crossline cells, `None` on overflow.
    pub fn num_cells(&self) -> Option<usize> {
        self.num_inlines.checked_mul(self.num_crosslines)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inclusive `[first, last]` inline numbers.
    pub fn inline_range(&self) -> (i32, i32) {
        (
            self.inline_start,
            self.inline_start + self.num_inlines as i32 - 1,
        )
    }

    pub fn crossline_range(&self) -> (i32, i32) {
        (
            self.crossline_start,
            self.crossline_start + self.num_crosslines as i32 - 1,
        )
    }

    pub fn inline_index(&self, line: i32) -> Option<usize> {
        axis_index(line, self.inline_start, self.num_inlines)
    }

    pub fn crossline_index(&self, line: i32) -> Option<usize> {
        axis_index(line, self.crossline_start, self.num_crosslines)
    }
}

fn axis_index(line: i32, start: i32, count: usize) -> Option<usize> {
    let offset = (line as i64) - (start as i64);
    if offset < 0 || offset >= count as i64 {
        return None;
    }
    Some(offset as usize)
}

#[cfg(test)]
mod tests {
    use super::VolumeDims;

    #[test]
    fn line_numbers_map_to_indices() {
        let dims = VolumeDims::new(50, 40, 10);
        assert_eq!(dims.inline_range(), (1200, 1249));
        assert_eq!(dims.crossline_range(), (2000, 2039));
        assert_eq!(dims.inline_index(1200), Some(0));
        assert_eq!(dims.inline_index(1249), Some(49));
        assert_eq!(dims.inline_index(1199), None);
        assert_eq!(dims.inline_index(1250), None);
        assert_eq!(dims.crossline_index(i32::MIN), None);
    }

    #[test]
    fn oversized_dims_do_not_overflow() {
        let dims = VolumeDims::new(usize::MAX / 2, 4, 10);
        assert_eq!(dims.num_cells(), None);
        assert_eq!(dims.checked_len(), None);
        assert_eq!(dims.len(), usize::MAX);
        assert_eq!(VolumeDims::new(3, 4, 5).checked_len(), Some(60));
    }
}
