use crate::slice::SliceAxis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    EmptySurvey,
    SampleCountMismatch {
        trace_index: usize,
        expected: usize,
        found: usize,
    },
    TraceOutOfRange {
        trace_index: usize,
        inline: i32,
        crossline: i32,
        inline_range: (i32, i32),
        crossline_range: (i32, i32),
    },
    DuplicateTrace {
        inline: i32,
        crossline: i32,
    },
    LineOutOfRange {
        axis: SliceAxis,
        line: i32,
        start: i32,
        end: i32,
    },
    DataLength {
        expected: usize,
        found: usize,
    },
    /// Header numbering spans far more grid cells than there are traces,
    /// or the grid would not fit in memory.
    GridTooLarge {
        /// Inline x crossline cell count; `None` when it overflows.
        cells: Option<usize>,
        traces: usize,
    },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::EmptySurvey => write!(f, "survey has no traces"),
            GeometryError::SampleCountMismatch {
                trace_index,
                expected,
                found,
            } => write!(
                f,
                "trace {trace_index} has {found} samples, expected {expected}"
            ),
            GeometryError::TraceOutOfRange {
                trace_index,
                inline,
                crossline,
                inline_range,
                crossline_range,
            } => write!(
                f,
                "trace {trace_index} at inline {inline}, crossline {crossline} lies outside \
                 inlines [{},{}] / crosslines [{},{}]",
                inline_range.0, inline_range.1, crossline_range.0, crossline_range.1
            ),
            GeometryError::DuplicateTrace { inline, crossline } => write!(
                f,
                "more than one trace at inline {inline}, crossline {crossline}"
            ),
            GeometryError::LineOutOfRange {
                axis,
                line,
                start,
                end,
            } => write!(f, "{axis} {line} out of range [{start},{end}]"),
            GeometryError::DataLength { expected, found } => write!(
                f,
                "volume holds {found} samples, dimensions require {expected}"
            ),
            GeometryError::GridTooLarge { cells, traces } => match cells {
                Some(cells) => write!(
                    f,
                    "trace headers span {cells} grid cells for only {traces} traces"
                ),
                None => write!(f, "trace headers span an unaddressable grid ({traces} traces)"),
            },
        }
    }
}

impl std::error::Error for GeometryError {}
