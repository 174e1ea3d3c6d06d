//! Animation-frame coalescing state.
//!
//! The host owns the actual frame request; this type only decides whether a new request is
//! needed and whether a fired frame should still run its job.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// One-pending-frame gate shared by every passive recompute signal of a single overlay.
pub struct FrameCoalescer {
    active: bool,
    pending: bool,
}

impl FrameCoalescer {
    /// A coalescer that accepts requests immediately.
    pub fn active() -> Self {
        Self {
            active: true,
            pending: false,
        }
    }

    /// Whether requests are currently accepted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a frame has been requested and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Starts accepting requests again after [`Self::deactivate`].
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Records a recompute signal. Returns `true` only when the caller must request a new frame.
    pub fn request(&mut self) -> bool {
        if !self.active || self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called from the frame callback. Returns `true` when the job should run.
    pub fn fire(&mut self) -> bool {
        let should_run = self.pending && self.active;
        self.pending = false;
        should_run
    }

    /// Drops a request whose frame could not be scheduled, so the next signal retries.
    pub fn abandon(&mut self) {
        self.pending = false;
    }

    /// Stops accepting requests. Returns `true` when a requested frame is still in flight and
    /// should be cancelled by the host.
    pub fn deactivate(&mut self) -> bool {
        let had_pending = self.pending;
        self.active = false;
        self.pending = false;
        had_pending
    }
}
