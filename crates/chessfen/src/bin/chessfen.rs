//! chessfen CLI: read a FEN board field from a board photo and detections.

use chessfen::io::{self, DetectionSet, FrameConfig, FrameReport};
use chessfen::{encode_board, FrameProcessor, PiecePlacement, PipelineParams};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

/// Exit status when the frame has no usable board.
const EXIT_NO_BOARD: u8 = 2;

#[derive(Parser)]
#[command(name = "chessfen")]
#[command(about = "Read the FEN board field off a chessboard photo and piece detections")]
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
    /// Locate the board in an image and encode the detected pieces.
    Detect(DetectArgs),

    /// Encode a `{ "e4": "P", ... }` placement as a FEN board field.
    Encode {
        /// Path to the placement JSON.
        #[arg(long)]
        placement: PathBuf,
    },

    /// Validate a FEN board field and print its placement as JSON.
    Parse {
        /// Board field, e.g. `8/8/8/8/4P3/8/8/8`.
        #[arg(long)]
        fen: String,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Input image (any size; resized to the canonical frame).
    #[arg(long, required_unless_present = "config")]
    image: Option<PathBuf>,

    /// Detections JSON, in the pixel space of the resized frame.
    #[arg(long, required_unless_present = "config")]
    detections: Option<PathBuf>,

    /// JSON run configuration; command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full FEN with placeholder game state.
    #[arg(long)]
    full: bool,

    /// Print the starting position when no board is found.
    #[arg(long)]
    fallback_to_start: bool,

    /// Write a JSON report.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the rectified board image.
    #[arg(long)]
    rectified: Option<PathBuf>,

    /// Board square size in the rectified image, in pixels.
    #[arg(long)]
    square_size: Option<u32>,

    /// Keep detections with confidence strictly above this.
    #[arg(long)]
    confidence: Option<f32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Encode { placement } => run_encode(&placement).map(|()| ExitCode::SUCCESS),
        Commands::Parse { fen } => run_parse(&fen).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let _ = chessfen::init_with_level(chessfen::level_from_verbosity(verbose));
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) {
    chessfen::init_tracing(false);
    let _ = tracing_log::LogTracer::init();
}

// ── detect ──────────────────────────────────────────────────────────────

struct DetectRun {
    image: PathBuf,
    detections: PathBuf,
    report: Option<PathBuf>,
    rectified: Option<PathBuf>,
    params: PipelineParams,
    full: bool,
    fallback_to_start: bool,
}

impl DetectRun {
    fn from_args(args: &DetectArgs) -> CliResult<Self> {
        let cfg = args.config.as_ref().map(FrameConfig::load_json).transpose()?;

        let image = args
            .image
            .clone()
            .or_else(|| cfg.as_ref().map(|c| PathBuf::from(&c.image_path)))
            .ok_or("missing --image")?;
        let detections = args
            .detections
            .clone()
            .or_else(|| cfg.as_ref().map(|c| PathBuf::from(&c.detections_path)))
            .ok_or("missing --detections")?;

        let mut params = cfg.as_ref().map(FrameConfig::build_params).unwrap_or_default();
        if let Some(s) = args.square_size {
            if s == 0 {
                return Err("--square-size must be positive".into());
            }
            params.square_size_px = s;
        }
        if let Some(t) = args.confidence {
            params.confidence_threshold = t;
        }

        Ok(Self {
            image,
            detections,
            report: args.report.clone().or_else(|| {
                cfg.as_ref().and_then(|c| c.output_path.as_ref().map(PathBuf::from))
            }),
            rectified: args.rectified.clone().or_else(|| {
                cfg.as_ref().and_then(|c| c.rectified_path.as_ref().map(PathBuf::from))
            }),
            params,
            full: args.full || cfg.as_ref().is_some_and(|c| c.full_fen),
            fallback_to_start: args.fallback_to_start
                || cfg.as_ref().is_some_and(|c| c.fallback_to_start),
        })
    }
}

fn run_detect(args: &DetectArgs) -> CliResult<ExitCode> {
    let run = DetectRun::from_args(args)?;

    log::info!("loading image {}", run.image.display());
    let frame = io::load_rgb_image(&run.image)?;
    let detections = DetectionSet::load_json(&run.detections)?.resolve();
    log::info!(
        "image {}x{}, {} detections",
        frame.width(),
        frame.height(),
        detections.len()
    );

    let processor = FrameProcessor::new(run.params.clone());
    let outcome = processor.process(&frame, &detections);

    if let (Ok(res), Some(path)) = (&outcome, &run.rectified) {
        res.rectified.image.save(path)?;
        log::info!("rectified board written to {}", path.display());
    }

    let report = FrameReport::from_outcome(&outcome, run.full, run.fallback_to_start);
    if let Some(path) = &run.report {
        report.write_json(path)?;
        log::info!("report written to {}", path.display());
    }

    match &outcome {
        Ok(res) => {
            println!("{}", res.fen(run.full));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            if let Some(fallback) = &report.fallback_fen {
                println!("{fallback}");
            }
            Ok(ExitCode::from(EXIT_NO_BOARD))
        }
    }
}

// ── encode / parse ──────────────────────────────────────────────────────

fn run_encode(path: &Path) -> CliResult<()> {
    let raw = std::fs::read_to_string(path)?;
    let placement = io::placement_from_json(&raw)?;
    println!("{}", encode_board(&placement));
    Ok(())
}

fn run_parse(fen: &str) -> CliResult<()> {
    let placement = PiecePlacement::from_fen_board(fen)?;
    println!("{}", io::placement_to_json(&placement)?);
    Ok(())
}
