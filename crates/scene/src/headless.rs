//! In-memory stand-ins for the host surface and frame clock, used by the CLI
//! and by tests that run without a window.

use crate::frame_loop::FrameScheduler;
use crate::viewport::{DrawingSurface, SurfaceSize};
use std::cell::Cell;

/// Drawing surface that only records its size.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    size: SurfaceSize,
    resizes: u32,
}

impl HeadlessSurface {
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn resize_count(&self) -> u32 {
        self.resizes
    }
}

impl DrawingSurface for HeadlessSurface {
    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.resizes += 1;
    }
}

/// Frame clock driven by hand: counts requests, the caller decides when to
/// run the next frame.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requested: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested so far.
    pub fn requested(&self) -> u64 {
        self.requested.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self) {
        self.requested.set(self.requested.get() + 1);
    }
}
