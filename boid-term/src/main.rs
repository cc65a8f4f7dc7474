use anyhow::{Context, Result};
use boid_shared::SimulationSettings;
use boid_term::{
    app::{TerminalApp, DEFAULT_TICK_MILLIS},
    build_flock, load_settings, run_headless,
};
use clap::Parser;
use crossterm::terminal;
use std::{fs::File, path::PathBuf, time::Duration};

#[derive(Parser, Debug)]
#[command(author, version, about = "Flocking simulation in the terminal", long_about = None)]
struct Args {
    /// JSON settings file; the flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of boids
    #[arg(short = 'n', long)]
    boids: Option<usize>,

    /// Interaction radius
    #[arg(short, long)]
    radius: Option<f64>,

    /// Seed for the initial placement
    #[arg(short, long)]
    seed: Option<u64>,

    /// Milliseconds to wait for a key between ticks
    #[arg(long, default_value_t = DEFAULT_TICK_MILLIS)]
    tick_ms: u64,

    /// Run without a terminal and print a JSON report
    #[arg(long)]
    headless: bool,

    /// Ticks to simulate in headless mode
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Surface width in headless mode
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Surface height in headless mode
    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn settings(&self) -> Result<SimulationSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => SimulationSettings::default(),
        };
        if let Some(boids) = self.boids {
            settings.boid_count = boids;
        }
        if let Some(radius) = self.radius {
            settings.radius = radius;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        Ok(settings)
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else if !args.headless {
        // Anything on stderr would be drawn over the flock
        builder.filter_level(log::LevelFilter::Error);
    }

    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    log::info!("Boid terminal starting...");
    let settings = args.settings().context("Failed to load settings")?;

    if args.headless {
        log::info!(
            "Headless run: {} ticks on a {}x{} surface",
            args.ticks,
            args.height,
            args.width
        );
        let report = run_headless(&settings, args.ticks, args.height, args.width);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (cols, rows) = terminal::size().context("failed to query terminal size")?;
    let flock = build_flock(&settings, rows as u32, cols as u32);
    let mut app = TerminalApp::new(flock, Duration::from_millis(args.tick_ms));

    app.run().context("Terminal error")?;

    Ok(())
}
