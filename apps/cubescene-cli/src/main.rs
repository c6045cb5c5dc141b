use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use cubescene_assets::{PendingTexture, TextureLoader, TextureSource};
use cubescene_scene::{
    DebugTextRenderer, FrameLoop, HeadlessSurface, ManualScheduler, SceneConfig, SceneContext,
    SurfaceSize, SyncOutcome, TextureSlot,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubescene-cli", about = "Headless tool for the cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML scene config; unset fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Texture URL or file path, overrides the config
    #[arg(long, global = true)]
    texture: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the resolved scene config as YAML
    Config,
    /// Run the frame loop against an in-memory surface
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Host surface size, WIDTHxHEIGHT
        #[arg(long, default_value = "800x600", value_parser = parse_size)]
        size: SurfaceSize,
        /// Resize the host to WIDTHxHEIGHT halfway through
        #[arg(long, value_parser = parse_size)]
        resize: Option<SurfaceSize>,
        /// Block until the texture load finishes before the first frame
        #[arg(long)]
        wait: bool,
        /// Print a JSON summary instead of the last frame
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Summary {
    scene: String,
    frames: u64,
    rotation: [f64; 3],
    aspect: f32,
    viewport: Option<[u32; 2]>,
    surface: [u32; 2],
    surface_resizes: u32,
    texture: String,
}

fn parse_size(s: &str) -> Result<SurfaceSize> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got {s:?}");
    };
    Ok(SurfaceSize::new(
        w.trim().parse().context("width")?,
        h.trim().parse().context("height")?,
    ))
}

fn resolve_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(texture) = &cli.texture {
        config.material.texture = TextureSource::from(texture.clone());
    }
    Ok(config)
}

fn texture_label(slot: &TextureSlot) -> String {
    match slot {
        TextureSlot::Pending(src) => format!("pending: {src}"),
        TextureSlot::Ready(tex) => format!("ready: {}x{} {}", tex.width, tex.height, tex.label),
        TextureSlot::Fallback { reason } => format!("fallback: {reason}"),
    }
}

/// Run `frames` frames headlessly. Returns the summary and the text of the
/// last rendered frame.
fn simulate(
    config: &SceneConfig,
    frames: u64,
    size: SurfaceSize,
    resize: Option<SurfaceSize>,
    wait: bool,
) -> (Summary, String) {
    let source = config.material.texture.clone();
    let mut texture = TextureLoader::new().load(source.clone());
    if wait {
        let result = texture.wait();
        texture = PendingTexture::resolved(source, result);
    }

    let mut surface = HeadlessSurface::default();
    let mut ctx = SceneContext::new(config, texture, size, &mut surface);
    let scheduler = ManualScheduler::new();
    let mut renderer = DebugTextRenderer::new();
    let (mut frame_loop, handle) = FrameLoop::start(config.animation.rotation_step, &scheduler);

    for i in 0..frames {
        if let Some(new_size) = resize.filter(|_| i == frames / 2) {
            let outcome = ctx.resize(new_size, &mut surface);
            if let SyncOutcome::ZeroArea { aspect } = outcome {
                tracing::info!(aspect, "resize to zero area kept previous aspect");
            }
        }
        // Infallible renderer.
        let Ok(_) = frame_loop.tick(&mut ctx, &mut renderer, &scheduler);
    }
    handle.stop();

    let rot = frame_loop.state().rotation;
    let summary = Summary {
        scene: ctx.id().to_string(),
        frames: frame_loop.frames(),
        rotation: [rot.x, rot.y, rot.z],
        aspect: ctx.camera().aspect(),
        viewport: ctx.viewport().metrics().map(|m| [m.width, m.height]),
        surface: [surface.size().width, surface.size().height],
        surface_resizes: surface.resize_count(),
        texture: texture_label(&ctx.scene().meshes()[0].material.map),
    };
    (summary, renderer.last_output().to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Info => {
            println!("cubescene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", cubescene_common::crate_info());
            println!("assets: {}", cubescene_assets::crate_info());
            println!("scene: {}", cubescene_scene::crate_info());
        }
        Commands::Config => {
            let config = resolve_config(&cli)?;
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            frames,
            size,
            resize,
            wait,
            json,
        } => {
            let config = resolve_config(&cli)?;
            let (summary, last_frame) = simulate(&config, *frames, *size, *resize, *wait);
            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Frames rendered: {}", summary.frames);
                print!("{last_frame}");
            }
        }
    }

    Ok(())
}
