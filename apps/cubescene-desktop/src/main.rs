use anyhow::{Context as _, Result};
use clap::Parser;
use cubescene_assets::{TextureLoader, TextureSource};
use cubescene_render_wgpu::{WgpuRenderer, create_renderer};
use cubescene_scene::{
    FrameLoop, FrameScheduler, LoopHandle, SceneConfig, SceneContext, SurfaceSize,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubescene-desktop", about = "Spinning textured cube in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML scene config; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Texture URL or file path, overrides the config
    #[arg(long)]
    texture: Option<String>,

    /// Initial window width in physical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

/// The window's redraw requests are the frame clock.
struct WindowScheduler(Arc<Window>);

impl FrameScheduler for WindowScheduler {
    fn request_frame(&self) {
        self.0.request_redraw();
    }
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    scheduler: WindowScheduler,
    renderer: WgpuRenderer,
    scene: SceneContext,
    frame_loop: FrameLoop,
    handle: LoopHandle,
}

struct App {
    config: SceneConfig,
    loader: TextureLoader,
    initial_size: PhysicalSize<u32>,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            config,
            loader: TextureLoader::new(),
            initial_size,
            running: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("cubescene")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let size = window.inner_size();
        let host = SurfaceSize::new(size.width, size.height);
        let mut renderer = create_renderer(window.clone(), host, &self.config.render)
            .context("initialize GPU")?;
        tracing::info!(
            backend = renderer.gpu().backend().to_str(),
            samples = renderer.sample_count(),
            "renderer ready"
        );

        let scene = SceneContext::load(&self.config, &self.loader, host, &mut renderer);
        let scheduler = WindowScheduler(window.clone());
        let (frame_loop, handle) =
            FrameLoop::start(self.config.animation.rotation_step, &scheduler);

        Ok(Running {
            window,
            scheduler,
            renderer,
            scene,
            frame_loop,
            handle,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        if let Some(running) = &self.running {
            running.handle.stop();
        }
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };
        if running.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                running.handle.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                running.scene.resize(
                    SurfaceSize::new(new_size.width, new_size.height),
                    &mut running.renderer,
                );
            }
            WindowEvent::RedrawRequested => {
                let Running {
                    scheduler,
                    renderer,
                    scene,
                    frame_loop,
                    ..
                } = running;
                if let Err(e) = frame_loop.tick(scene, renderer, &*scheduler) {
                    self.fail(event_loop, anyhow::Error::new(e).context("render frame"));
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(texture) = cli.texture {
        config.material.texture = TextureSource::from(texture);
    }

    tracing::info!("cubescene-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
