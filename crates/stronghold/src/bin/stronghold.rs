use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use stronghold::camserver::{
    CamServerError, CameraServerClient, FrameSync, Handshake, ImageSize, CAMERA_SERVER_PORT,
};
use stronghold::core::Size;
use stronghold::detect::{
    detect_frame, load_config, load_frame, load_trajectory, write_overlay, write_stages,
};
use stronghold::vision::{TargetPipeline, TargetShape};

#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
#[cfg(not(feature = "tracing"))]
use stronghold::core::{init_from_env, init_with_level};
#[cfg(feature = "tracing")]
use stronghold::core::init_tracing;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

#[derive(Parser, Debug)]
#[command(
    name = "stronghold",
    version,
    about = "Find FIRST Stronghold goals and boulders in images or a camera-server stream"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). Defaults to STRONGHOLD_LOG or info.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Emit JSON log lines (tracing builds only).
    #[arg(long, global = true)]
    json_log: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect a target in an image file and print a JSON report.
    Detect(DetectArgs),
    /// Connect to a camera server and track a target frame by frame.
    Stream(StreamArgs),
    /// Print the highest point of a sampled trajectory.
    Trajectory(TrajectoryArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    image: PathBuf,
    /// goal or boulder.
    #[arg(long, default_value = "goal")]
    target: TargetShape,
    /// Vision config JSON; defaults are used for missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also write the report here.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the winning contour as a PNG.
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// Dump every preprocessing stage into this directory.
    #[arg(long)]
    stages: Option<PathBuf>,
    /// Log per-rule scores of every candidate contour.
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Args, Debug)]
struct StreamArgs {
    host: String,
    #[arg(long, default_value_t = CAMERA_SERVER_PORT)]
    port: u16,
    #[arg(long, default_value_t = 15)]
    fps: u32,
    /// 640x480, 320x240 or 160x120.
    #[arg(long, default_value = "320x240")]
    size: ImageSize,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
    #[arg(long, default_value = "goal")]
    target: TargetShape,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Treat every socket read as one frame instead of following the length field.
    #[arg(long)]
    chunked: bool,
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Args, Debug)]
struct TrajectoryArgs {
    /// JSON list of `{ "time": t, "position": [x, y] }`.
    points: PathBuf,
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8, json: bool) {
    // filtering comes from RUST_LOG in tracing builds
    let _ = LogTracer::init();
    init_tracing(json);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, json: bool) {
    if json {
        eprintln!("--json-log needs a build with the `tracing` feature");
    }
    let res = match verbose {
        0 => init_from_env(LevelFilter::Info),
        1 => init_with_level(LevelFilter::Debug),
        _ => init_with_level(LevelFilter::Trace),
    };
    if let Err(err) = res {
        eprintln!("logger already installed: {err}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_log);

    let res = match cli.command {
        Command::Detect(args) => run_detect(args),
        Command::Stream(args) => run_stream(args),
        Command::Trajectory(args) => run_trajectory(args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_detect(args: DetectArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let frame = load_frame(&args.image)?;
    let (report, estimate) = detect_frame(
        &frame,
        &args.image.display().to_string(),
        args.target,
        &config,
        args.diagnostics,
    );

    if let Some(dir) = &args.stages {
        write_stages(dir, &TargetPipeline::new(args.target, &config).stages(&frame))?;
    }
    if let Some(path) = &args.overlay {
        let size = Size::new(report.width, report.height);
        write_overlay(path, size, estimate.as_ref())?;
    }
    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("wrote report to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_stream(args: StreamArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let pipeline = TargetPipeline::new(args.target, &config).with_diagnostics(args.diagnostics);
    let sync = if args.chunked {
        FrameSync::Chunked
    } else {
        FrameSync::Framed
    };

    let handshake = Handshake::new(args.fps, args.size);
    let mut client = CameraServerClient::connect((args.host.as_str(), args.port), handshake, sync)?;
    info!(
        "streaming {} at {} fps from {}:{}",
        args.size, args.fps, args.host, args.port
    );

    let started = Instant::now();
    let mut last = started;
    loop {
        if args.frames.is_some_and(|n| client.frames_received() >= n) {
            break;
        }
        let frame = match client.next_frame() {
            Ok(frame) => frame,
            Err(CamServerError::ConnectionClosed) => {
                warn!("camera server closed the stream");
                break;
            }
            Err(CamServerError::Decode(err)) => {
                warn!("dropping undecodable frame: {err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let now = Instant::now();
        let fps = 1.0 / now.duration_since(last).as_secs_f64().max(1e-9);
        last = now;

        match pipeline.estimate(&frame) {
            Some(est) => {
                let (h, v) = est.angles.map(|a| a.to_degrees()).unwrap_or((f64::NAN, f64::NAN));
                info!(
                    "frame {}: {} score {:.1}, distance {:.1} in, angles {:.1}°/{:.1}°, {:.1} fps",
                    client.frames_received(),
                    args.target,
                    est.scored.score,
                    est.distance,
                    h,
                    v,
                    fps
                );
            }
            None => info!(
                "frame {}: no {}, {:.1} fps",
                client.frames_received(),
                args.target,
                fps
            ),
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "{} frames in {:.1}s, {} discarded",
        client.frames_received(),
        elapsed,
        client.discarded()
    );
    Ok(())
}

fn run_trajectory(args: TrajectoryArgs) -> Result<(), Box<dyn Error>> {
    let trajectory = load_trajectory(&args.points)?;
    let apex = trajectory
        .max_height()
        .ok_or("trajectory has no points")?;
    println!("{}", serde_json::to_string_pretty(apex)?);
    Ok(())
}
