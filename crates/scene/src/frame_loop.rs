use crate::context::SceneContext;
use crate::renderer::Renderer;
use glam::{DVec3, Vec3};
use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host frame clock. The loop asks it for the next frame after each one it
/// completes; the host calls [`FrameLoop::tick`] when that frame is due.
pub trait FrameScheduler {
    fn request_frame(&self);
}

/// Rotation of the spinning mesh, one angle per axis in `[0, 2π)`.
///
/// Kept in `f64` so long runs do not drift from `frames × step`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    pub rotation: DVec3,
}

impl RenderState {
    /// Add `step` radians to every axis, wrapping at a full turn.
    pub fn advance(&mut self, step: f64) {
        self.rotation = (self.rotation + DVec3::splat(step)).map(|a| a.rem_euclid(TAU));
    }

    pub fn euler(&self) -> Vec3 {
        self.rotation.as_vec3()
    }
}

/// Stop switch for a running frame loop. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Deregister the loop. The next tick renders nothing and schedules
    /// nothing.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!("frame loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame `index` was rendered and the next one requested.
    Rendered { index: u64 },
    /// The loop was stopped; nothing happened.
    Stopped,
}

/// Per-frame update and render, driven by a host frame clock.
#[derive(Debug)]
pub struct FrameLoop {
    state: RenderState,
    step: f64,
    frames: u64,
    handle: LoopHandle,
}

impl FrameLoop {
    /// Create the loop and request its first frame.
    pub fn start(step: f64, scheduler: &dyn FrameScheduler) -> (Self, LoopHandle) {
        let handle = LoopHandle {
            running: Arc::new(AtomicBool::new(true)),
        };
        let frame_loop = Self {
            state: RenderState::default(),
            step,
            frames: 0,
            handle: handle.clone(),
        };
        tracing::debug!(step, "frame loop started");
        scheduler.request_frame();
        (frame_loop, handle)
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn handle(&self) -> &LoopHandle {
        &self.handle
    }

    /// Run one frame: resolve finished asset loads, advance the rotation,
    /// render, then request the next frame.
    ///
    /// A render error stops the loop and is returned to the host.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        ctx: &mut SceneContext,
        renderer: &mut R,
        scheduler: &dyn FrameScheduler,
    ) -> Result<FrameStatus, R::Error> {
        if !self.handle.is_running() {
            return Ok(FrameStatus::Stopped);
        }
        let index = self.frames;
        let _span =
            tracing::trace_span!("frame", scene = %ctx.id().short(), index).entered();

        ctx.poll_assets();
        self.state.advance(self.step);
        ctx.set_rotation(self.state.euler());

        if let Err(e) = renderer.render(ctx.scene(), ctx.camera()) {
            tracing::error!("render failed on frame {index}: {e}");
            self.handle.stop();
            return Err(e);
        }

        self.frames += 1;
        scheduler.request_frame();
        Ok(FrameStatus::Rendered { index })
    }
}
