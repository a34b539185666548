//! Headless Runner
//!
//! Loads a scene file, runs its effects for a number of frames and prints
//! the resulting surface as text or as a JSON snapshot. Used for testing
//! scenes without a renderer.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use glyphgrid::scene::{render, run_frames};
use glyphgrid::{EffectRegistry, OutputFormat, Parser, Scene};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(clap::Parser, Debug)]
#[command(name = "glyphgrid-headless")]
#[command(version)]
#[command(about = "Run a glyphgrid scene without a renderer", long_about = None)]
struct Args {
    /// Scene file (TOML)
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Override the number of frames to run
    #[arg(short, long, value_name = "N")]
    frames: Option<usize>,

    /// Override the seconds per frame
    #[arg(long, value_name = "SECONDS")]
    frame_time: Option<f64>,

    /// Override the output format
    #[arg(short = 'o', long, value_enum)]
    format: Option<OutputFormat>,

    /// Also write the final surface state as JSON
    #[arg(long, value_name = "FILE")]
    save_state: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> glyphgrid::Result<()> {
    let mut scene = Scene::load(&args.scene)?;
    if let Some(frames) = args.frames {
        scene.runner.frames = frames;
    }
    if let Some(frame_time) = args.frame_time {
        scene.runner.frame_time = frame_time;
    }
    if let Some(format) = args.format {
        scene.runner.output = format;
    }
    scene.runner.validate()?;

    let mut surface = scene.build(&EffectRegistry::with_builtin(), &Parser::new())?;
    let changed = run_frames(&mut surface, &scene.runner);
    tracing::debug!(
        frames = scene.runner.frames,
        changed,
        effects = surface.effect_count(),
        "scene finished"
    );

    if let Some(path) = &args.save_state {
        let json = surface.save_state()?.to_json()?;
        fs::write(path, json).map_err(|source| glyphgrid::Error::Io {
            path: path.clone(),
            source,
        })?;
    }

    let output = render(&surface, scene.runner.output)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").map_err(|source| glyphgrid::Error::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    Ok(())
}
