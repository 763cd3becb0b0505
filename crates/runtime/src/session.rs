use survey::{extract_slice_checked, GeometryError, Slice, SliceAxis, Volume};
use tracing::{debug, info, warn};

use crate::request::{RequestId, RequestTracker};

/// A slice extraction to be run against the session's volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SliceRequest {
    pub id: RequestId,
    pub axis: SliceAxis,
    pub line: i32,
}

impl SliceRequest {
    /// Pure extraction; may run off the navigation thread.
    pub fn run(&self, volume: &Volume) -> Result<Slice, GeometryError> {
        extract_slice_checked(volume, self.axis, self.line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Updated,
    /// A newer request was issued after this one; its result was dropped.
    Stale,
    /// The line is outside the volume; the current line did not move.
    Rejected(GeometryError),
}

/// Owns the session volume and the single "current slice" value.
///
/// Navigation is request/apply: [`SliceSession::request`] numbers the event,
/// [`SliceRequest::run`] extracts, and [`SliceSession::apply`] installs the
/// result only if no newer request was issued in the meantime.
#[derive(Debug)]
pub struct SliceSession {
    volume: Volume,
    mode: SliceAxis,
    inline: i32,
    crossline: i32,
    line_step: i32,
    current: Option<Slice>,
    requests: RequestTracker,
}

fn middle_line(start: i32, count: usize) -> i32 {
    start + (count / 2) as i32
}

impl SliceSession {
    /// Opens on the middle inline of `volume`.
    pub fn new(volume: Volume) -> Self {
        let mut session = Self {
            inline: middle_line(volume.inline_start(), volume.num_inlines()),
            crossline: middle_line(volume.crossline_start(), volume.num_crosslines()),
            volume,
            mode: SliceAxis::Inline,
            line_step: 1,
            current: None,
            requests: RequestTracker::new(),
        };
        let _ = session.navigate(SliceAxis::Inline, session.inline);
        session
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn mode(&self) -> SliceAxis {
        self.mode
    }

    pub fn inline(&self) -> i32 {
        self.inline
    }

    pub fn crossline(&self) -> i32 {
        self.crossline
    }

    /// Line number along the active navigation axis.
    pub fn current_line(&self) -> i32 {
        self.line_for(self.mode)
    }

    pub fn current_slice(&self) -> Option<&Slice> {
        self.current.as_ref()
    }

    pub fn line_step(&self) -> i32 {
        self.line_step
    }

    /// Lines moved per [`next`](Self::next)/[`previous`](Self::previous); at least 1.
    pub fn set_line_step(&mut self, step: i32) {
        self.line_step = step.max(1);
    }

    fn line_for(&self, axis: SliceAxis) -> i32 {
        match axis {
            SliceAxis::Inline => self.inline,
            SliceAxis::Crossline => self.crossline,
        }
    }

    pub fn request(&mut self, axis: SliceAxis, line: i32) -> SliceRequest {
        SliceRequest {
            id: self.requests.issue(),
            axis,
            line,
        }
    }

    pub fn apply(
        &mut self,
        request: SliceRequest,
        result: Result<Slice, GeometryError>,
    ) -> NavigationOutcome {
        if !self.requests.settle(request.id) {
            debug!(
                request = request.id.0,
                axis = %request.axis,
                line = request.line,
                "dropping stale slice result"
            );
            return NavigationOutcome::Stale;
        }
        match result {
            Ok(slice) => {
                match request.axis {
                    SliceAxis::Inline => self.inline = request.line,
                    SliceAxis::Crossline => self.crossline = request.line,
                }
                self.mode = request.axis;
                info!(slice = %slice.name(), "navigated");
                self.current = Some(slice);
                NavigationOutcome::Updated
            }
            Err(err) => {
                warn!(%err, "navigation rejected");
                NavigationOutcome::Rejected(err)
            }
        }
    }

    /// Request, extract and apply in one step.
    pub fn navigate(&mut self, axis: SliceAxis, line: i32) -> Result<&Slice, GeometryError> {
        let request = self.request(axis, line);
        let result = request.run(&self.volume);
        if let NavigationOutcome::Rejected(err) = self.apply(request, result) {
            return Err(err);
        }
        self.current.as_ref().ok_or(GeometryError::EmptySurvey)
    }

    fn step_by(&mut self, delta: i32) -> Result<&Slice, GeometryError> {
        let (start, end) = match self.mode {
            SliceAxis::Inline => self.volume.dims().inline_range(),
            SliceAxis::Crossline => self.volume.dims().crossline_range(),
        };
        let target = (self.current_line() + delta).clamp(start, end.max(start));
        self.navigate(self.mode, target)
    }

    /// Advances along the active axis, stopping at the last line.
    pub fn next(&mut self) -> Result<&Slice, GeometryError> {
        self.step_by(self.line_step)
    }

    /// Steps back along the active axis, stopping at the first line.
    pub fn previous(&mut self) -> Result<&Slice, GeometryError> {
        self.step_by(-self.line_step)
    }

    /// Switches axis and shows the remembered line on that axis.
    pub fn set_mode(&mut self, axis: SliceAxis) -> Result<&Slice, GeometryError> {
        self.navigate(axis, self.line_for(axis))
    }

    /// Restores a saved view. Lines outside the volume fall back to the
    /// middle line of their axis.
    pub fn restore(&mut self, mode: SliceAxis, inline: i32, crossline: i32) -> Result<&Slice, GeometryError> {
        let dims = self.volume.dims();
        self.inline = if dims.inline_index(inline).is_some() {
            inline
        } else {
            middle_line(dims.inline_start, dims.num_inlines)
        };
        self.crossline = if dims.crossline_index(crossline).is_some() {
            crossline
        } else {
            middle_line(dims.crossline_start, dims.num_crosslines)
        };
        self.set_mode(mode)
    }

    /// Swaps in a new volume. In-flight requests against the old one become stale.
    pub fn replace_volume(&mut self, volume: Volume) -> Result<&Slice, GeometryError> {
        self.requests.invalidate();
        self.inline = middle_line(volume.inline_start(), volume.num_inlines());
        self.crossline = middle_line(volume.crossline_start(), volume.num_crosslines());
        self.volume = volume;
        self.current = None;
        self.navigate(SliceAxis::Inline, self.inline)
    }
}
