/// Monotonic request numbering with last-request-wins semantics.
///
/// Every navigation event gets a fresh id. Only the most recently issued id
/// is current; results carrying any older id are stale and must be dropped
/// instead of overwriting newer state.

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    latest: Option<RequestId>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.latest = Some(id);
        id
    }

    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// Marks `id` as settled if it is still current. Returns whether it was.
    pub fn settle(&mut self, id: RequestId) -> bool {
        if self.is_current(id) {
            self.latest = None;
            true
        } else {
            false
        }
    }

    /// Invalidates whatever is in flight without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}
