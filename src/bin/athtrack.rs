use std::path::PathBuf;

use athtrack::error::Error;
use athtrack::replay::DetectionLog;
use athtrack::{analysis, report, Config};
use clap::Parser;

/// Tracks players through a detection dump and writes per-player metrics.
#[derive(Parser, Debug)]
#[command(name = "athtrack", version)]
struct Args {
    /// Detection dump: `#<fps> <width> <height>` header, then `<frame>:<json>` lines
    detections: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the report and plot series
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum total movement in pixels for a player to be reported
    #[arg(long)]
    min_movement: Option<f32>,

    /// Minimum number of speed samples for a player to be reported
    #[arg(long)]
    min_frames: Option<usize>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    if let Some(dir) = args.output {
        config.output_dir = dir;
    }
    if let Some(v) = args.min_movement {
        config.filter.min_movement = v;
    }
    if let Some(v) = args.min_frames {
        config.filter.min_frames = v;
    }
    config.validate()?;

    let dump = DetectionLog::from_path(&args.detections)?;
    let mut source = dump.source();

    let mut seen = 0u64;
    let max_frames = args.max_frames;
    let aggregate = analysis::run_until(&mut source, dump, &config, |_| {
        let stop = max_frames.map_or(false, |max| seen >= max);
        seen += 1;
        stop
    })?;

    let written = report::emit(&aggregate, &config.output_dir)?;
    log::info!("wrote {} files", written.len());

    Ok(())
}
