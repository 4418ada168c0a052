use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ambient3d::config::{CircuitConfig, CubeConfig, ParticleConfig, PhoneConfig, SceneKind};
use ambient3d::terminal::{present, surface_for_cells, Action, InputTranslator, TerminalGuard};
use ambient3d::{
    CircuitGrid, CubeViewer, Engine, LocalHost, NoSprites, ParticleField, PhoneScene,
    PixelCanvas, Scene, SpriteLoader, ThreadedLoader,
};
use clap::Parser;
use crossterm::event;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum AppError {
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("terminal size is unavailable")]
    NoTerminalSize,
}

/// Ambient background animations in the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Animation to run
    #[arg(long, value_enum, default_value_t = SceneKind::Particles)]
    scene: SceneKind,

    /// Frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Device pixels per logical pixel; one cell is 1x2 device pixels
    #[arg(long, default_value_t = 0.25)]
    pixel_ratio: f64,

    /// Seed for entity placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Image shown on a floating icon (phone scene), in catalog order
    #[arg(long = "icon", value_name = "PATH")]
    icons: Vec<PathBuf>,

    /// Exit after rendering this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Write logs here (filtered by AMBIENT3D_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let filter =
        EnvFilter::try_from_env("AMBIENT3D_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_scene(args: &Args) -> Box<dyn Scene> {
    match args.scene {
        SceneKind::Particles => Box::new(ParticleField::new(ParticleConfig::default())),
        SceneKind::Circuit => Box::new(CircuitGrid::new(CircuitConfig::default())),
        SceneKind::Phone => {
            let config = PhoneConfig::default().with_sources(args.icons.iter().cloned());
            let loader: Box<dyn SpriteLoader> = if args.icons.is_empty() {
                Box::new(NoSprites)
            } else {
                Box::new(ThreadedLoader::new())
            };
            Box::new(PhoneScene::new(config, loader))
        }
        SceneKind::Cube => Box::new(CubeViewer::new(CubeConfig::default())),
    }
}

/// Feeds terminal input to the host and ticks the engine at a fixed rate
/// until quit, the frame limit, or an I/O error.
fn event_loop(
    args: &Args,
    engine: &mut Engine<Box<dyn Scene>>,
    host: &mut LocalHost<PixelCanvas>,
    mut grid: (u16, u16),
    out: &mut impl Write,
) -> Result<(), AppError> {
    let interval = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut translator = InputTranslator::new(args.pixel_ratio);
    let mut next_frame_at = Instant::now();

    loop {
        let now = Instant::now();
        if now < next_frame_at {
            if event::poll(next_frame_at - now)? {
                match translator.translate(&event::read()?) {
                    Some(Action::Quit) => return Ok(()),
                    Some(Action::Forward(event)) => host.dispatch(event),
                    Some(Action::Resize { columns, rows }) => {
                        grid = (columns, rows);
                        host.resize(surface_for_cells(columns, rows, args.pixel_ratio));
                    }
                    None => {}
                }
            }
            continue;
        }

        next_frame_at += interval;
        if next_frame_at < now {
            next_frame_at = now + interval;
        }
        let Some(frame) = host.next_frame() else {
            return Ok(());
        };
        engine.tick(host, frame);
        if let Some(canvas) = host.surface_ref() {
            present(canvas, grid.0, grid.1, &mut *out)?;
        }
        if args.frames.is_some_and(|limit| engine.frames() >= limit) {
            return Ok(());
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let size = termsize::get().ok_or(AppError::NoTerminalSize)?;
    let grid = (size.cols, size.rows);
    let mut host = LocalHost::new(PixelCanvas::new(surface_for_cells(
        grid.0,
        grid.1,
        args.pixel_ratio,
    )));
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut engine = Engine::new(build_scene(&args), rng);

    let _guard = TerminalGuard::enter()?;
    if let Err(err) = engine.start(&mut host) {
        warn!(%err, "render loop not started");
        return Ok(());
    }
    info!(scene = ?args.scene, columns = grid.0, rows = grid.1, fps = args.fps, "running");

    let mut stdout = io::stdout().lock();
    let outcome = event_loop(&args, &mut engine, &mut host, grid, &mut stdout);
    engine.stop(&mut host);
    info!(frames = engine.frames(), "finished");
    outcome
}

/// Main function
fn main() -> Result<(), AppError> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    run(args)
}
