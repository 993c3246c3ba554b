//! lane-geometry CLI: run the lane pipeline over a frame sequence.

use clap::{Args, Parser, Subcommand};
use lane_geometry::{LaneDetectorParams, LaneFrameReport, LaneTracker};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "lane-geometry")]
#[command(about = "Estimate lane curvature and lateral offset from calibrated camera frames")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process frames in order, printing one JSON report per line.
    Run(RunArgs),

    /// Write the default calibration as pretty JSON.
    InitConfig {
        /// Destination path.
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Detector params (JSON). Defaults to the built-in calibration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the road-area masks (PNG, one per frame).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also write the sliding-window search image per frame.
    #[arg(long)]
    debug: bool,

    /// Frame images, processed in the given order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        lane_geometry::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = lane_geometry::core::level_from_verbosity(verbose);
        if let Err(err) = lane_geometry::core::init_with_level(level) {
            eprintln!("logger already installed: {err}");
        }
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::InitConfig { path } => {
            LaneDetectorParams::default().write_json(&path)?;
            log::info!("default params written to {}", path.display());
            Ok(())
        }
    }
}

fn frame_stem(path: &Path, index: usize) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("frame_{index:05}"))
}

fn run(args: &RunArgs) -> CliResult<()> {
    let mut params = match &args.config {
        Some(path) => LaneDetectorParams::load_json(path)?,
        None => LaneDetectorParams::default(),
    };
    if args.debug {
        params.collect_debug = true;
    }
    let mut tracker = LaneTracker::new(params)?;

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;
    for (index, path) in args.frames.iter().enumerate() {
        let name = path.display().to_string();
        let report = match tracker.process_path(path) {
            Ok(detection) => {
                if let Some(dir) = &args.out_dir {
                    let stem = frame_stem(path, index);
                    let detector = tracker.detector();
                    detector
                        .road_area_mask(&detection)
                        .save(dir.join(format!("{stem}_road.png")))?;
                    if let Some(debug) = &detection.debug {
                        detector
                            .search_debug_image(&debug.rectified, &detection.search)
                            .save(dir.join(format!("{stem}_search.png")))?;
                    }
                }
                LaneFrameReport::from_detection(name, &detection)
            }
            Err(err) => {
                log::warn!("frame {name} skipped: {err}");
                failed += 1;
                LaneFrameReport::failed(name, err)
            }
        };
        writeln!(out, "{}", report.to_json_line()?)?;
    }

    log::info!(
        "processed {} frames ({} failed), final fallback streak {}",
        args.frames.len(),
        failed,
        tracker.fallback_streak()
    );
    Ok(())
}
