use crate::camera::PerspectiveCamera;

/// Pixel size of the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Measured host surface dimensions. Only built for non-zero sizes, so the
/// aspect ratio is always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
}

impl ViewportMetrics {
    pub fn measure(size: SurfaceSize) -> Option<Self> {
        if size.is_empty() {
            return None;
        }
        Some(Self {
            width: size.width,
            height: size.height,
            aspect: size.width as f32 / size.height as f32,
        })
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// The backing surface the renderer draws into.
pub trait DrawingSurface {
    fn resize(&mut self, size: SurfaceSize);
}

/// What a viewport sync did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// New size applied to camera and drawing surface.
    Resized(ViewportMetrics),
    /// Same size as the last sync; nothing changed.
    Unchanged,
    /// Host reported zero area; camera kept a safe aspect, surface untouched.
    ZeroArea { aspect: f32 },
}

/// Keeps the camera aspect ratio and drawing surface in step with the host
/// surface size.
#[derive(Debug, Clone)]
pub struct ViewportBinding {
    metrics: Option<ViewportMetrics>,
    fallback_aspect: f32,
}

impl ViewportBinding {
    pub fn new(fallback_aspect: f32) -> Self {
        Self {
            metrics: None,
            fallback_aspect,
        }
    }

    /// Last applied non-zero metrics.
    pub fn metrics(&self) -> Option<ViewportMetrics> {
        self.metrics
    }

    /// Apply a host size. Called once at startup and on every resize event.
    pub fn sync<S: DrawingSurface + ?Sized>(
        &mut self,
        host: SurfaceSize,
        camera: &mut PerspectiveCamera,
        surface: &mut S,
    ) -> SyncOutcome {
        let _span =
            tracing::debug_span!("viewport_sync", width = host.width, height = host.height)
                .entered();

        let Some(metrics) = ViewportMetrics::measure(host) else {
            let aspect = self
                .metrics
                .map(|m| m.aspect)
                .unwrap_or(self.fallback_aspect);
            tracing::warn!(
                width = host.width,
                height = host.height,
                aspect,
                "host surface has zero area, keeping aspect"
            );
            camera.set_aspect(aspect);
            return SyncOutcome::ZeroArea { aspect };
        };

        if self.metrics == Some(metrics) {
            camera.set_aspect(metrics.aspect);
            tracing::trace!("viewport unchanged");
            return SyncOutcome::Unchanged;
        }

        camera.set_aspect(metrics.aspect);
        surface.resize(metrics.size());
        self.metrics = Some(metrics);
        tracing::debug!(aspect = metrics.aspect, "viewport resized");
        SyncOutcome::Resized(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    fn setup() -> (ViewportBinding, PerspectiveCamera, HeadlessSurface) {
        (
            ViewportBinding::new(1.0),
            PerspectiveCamera::default(),
            HeadlessSurface::default(),
        )
    }

    #[test]
    fn startup_then_resize_scenario() {
        let (mut binding, mut cam, mut surface) = setup();

        let out = binding.sync(SurfaceSize::new(800, 600), &mut cam, &mut surface);
        assert!(matches!(out, SyncOutcome::Resized(_)));
        assert!((cam.aspect() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(surface.size(), SurfaceSize::new(800, 600));

        let out = binding.sync(SurfaceSize::new(400, 300), &mut cam, &mut surface);
        assert!(matches!(out, SyncOutcome::Resized(_)));
        assert!((cam.aspect() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(surface.size(), SurfaceSize::new(400, 300));
        assert_eq!(surface.resize_count(), 2);
    }

    #[test]
    fn aspect_tracks_every_resize() {
        let (mut binding, mut cam, mut surface) = setup();
        for (w, h) in [(1280, 720), (300, 900), (1, 1), (1920, 1080), (7, 3)] {
            binding.sync(SurfaceSize::new(w, h), &mut cam, &mut surface);
            assert_eq!(cam.aspect(), w as f32 / h as f32);
            assert_eq!(binding.metrics().unwrap().size(), SurfaceSize::new(w, h));
        }
    }

    #[test]
    fn zero_area_before_any_size_uses_fallback() {
        let (mut binding, mut cam, mut surface) = setup();
        let out = binding.sync(SurfaceSize::new(0, 600), &mut cam, &mut surface);
        assert_eq!(out, SyncOutcome::ZeroArea { aspect: 1.0 });
        assert_eq!(cam.aspect(), 1.0);
        assert!(cam.projection_matrix().is_finite());
        assert_eq!(surface.resize_count(), 0);
    }

    #[test]
    fn zero_area_keeps_last_good_aspect() {
        let (mut binding, mut cam, mut surface) = setup();
        binding.sync(SurfaceSize::new(1600, 900), &mut cam, &mut surface);
        let out = binding.sync(SurfaceSize::new(1600, 0), &mut cam, &mut surface);
        assert_eq!(out, SyncOutcome::ZeroArea { aspect: 1600.0 / 900.0 });
        assert!(cam.aspect().is_finite());
        assert!(cam.view_projection().is_finite());
        assert_eq!(surface.size(), SurfaceSize::new(1600, 900));

        binding.sync(SurfaceSize::new(0, 0), &mut cam, &mut surface);
        assert_eq!(cam.aspect(), 1600.0 / 900.0);
    }

    #[test]
    fn identical_resize_is_noop() {
        let (mut binding, mut cam, mut surface) = setup();
        binding.sync(SurfaceSize::new(640, 480), &mut cam, &mut surface);
        let first = cam.config();
        let first_proj = cam.projection_matrix();

        let out = binding.sync(SurfaceSize::new(640, 480), &mut cam, &mut surface);
        assert_eq!(out, SyncOutcome::Unchanged);
        assert_eq!(cam.config(), first);
        assert_eq!(cam.projection_matrix(), first_proj);
        assert_eq!(surface.resize_count(), 1);
    }
}
