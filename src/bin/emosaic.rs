use std::path::PathBuf;

use clap::{Parser, Subcommand};

use emosaic::{
    AnimationLoop, CountedScheduler, CpuSurface, FfmpegEncoder, FfmpegVideoSource, FrameScheduler,
    FrameSink, PngSequenceSink, Rasterizer, RecordingTarget, RefreshScheduler, Resolution,
    SurfaceSize, VideoMetadata, default_mp4_config, probe_video,
};

#[derive(Parser, Debug)]
#[command(name = "emosaic", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the mosaic of a video to an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the mosaic of a video to a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input video path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    grid: GridArgs,

    /// Stop after this many frames instead of the full video.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Pace rendering at the source frame rate instead of going flat out.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input video path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for frame_00000.png, frame_00001.png, …
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    grid: GridArgs,

    /// Stop after this many frames instead of the full video.
    #[arg(long)]
    max_frames: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct GridArgs {
    /// Glyph grid columns.
    #[arg(long, default_value_t = 15)]
    cols: u32,

    /// Glyph grid rows.
    #[arg(long, default_value_t = 15)]
    rows: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn frame_budget(meta: &VideoMetadata, max_frames: Option<u64>) -> anyhow::Result<u64> {
    match (max_frames, meta.total_frames()) {
        (Some(m), Some(total)) => Ok(m.min(total)),
        (Some(m), None) => Ok(m),
        (None, Some(total)) => Ok(total),
        (None, None) => anyhow::bail!(
            "source reports neither a duration nor a frame count; pass --max-frames to bound the render"
        ),
    }
}

fn run_mosaic(
    in_path: PathBuf,
    grid: GridArgs,
    sink: impl FrameSink + 'static,
    scheduler: Box<dyn FrameScheduler>,
) -> anyhow::Result<()> {
    let resolution = Resolution::new(grid.cols, grid.rows)?;
    let video = FfmpegVideoSource::open(in_path);
    let target = RecordingTarget::new(CpuSurface::new(SurfaceSize::ZERO), sink);
    let raster = Rasterizer::new(Box::new(target));

    let mut animation = AnimationLoop::new(resolution, Box::new(video), raster, scheduler);
    animation.run()?;
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let meta = probe_video(&args.in_path)?;
    let fps = meta.fps().round().max(1.0) as u32;
    let budget = frame_budget(&meta, args.max_frames)?;
    let encoder = FfmpegEncoder::new(default_mp4_config(&args.out, meta.width, meta.height, fps))?;

    let scheduler: Box<dyn FrameScheduler> = if args.realtime {
        Box::new(PacedBudget {
            pace: RefreshScheduler::from_hz(fps),
            budget: CountedScheduler::new(budget),
        })
    } else {
        Box::new(CountedScheduler::new(budget))
    };

    run_mosaic(args.in_path, args.grid, encoder, scheduler)?;
    println!("wrote {} ({budget} frames)", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let meta = probe_video(&args.in_path)?;
    let budget = frame_budget(&meta, args.max_frames)?;
    let sink = PngSequenceSink::new(&args.out)?;

    run_mosaic(
        args.in_path,
        args.grid,
        sink,
        Box::new(CountedScheduler::new(budget)),
    )?;
    println!("wrote {budget} frames to {}", args.out.display());
    Ok(())
}

/// Real-time pacing with a hard frame budget on top.
struct PacedBudget {
    pace: RefreshScheduler,
    budget: CountedScheduler,
}

impl FrameScheduler for PacedBudget {
    fn next_tick(&mut self) -> bool {
        self.budget.next_tick() && self.pace.next_tick()
    }
}
