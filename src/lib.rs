#![forbid(unsafe_code)]

pub mod animation;
pub mod encode_ffmpeg;
pub mod error;
pub mod frame;
pub mod grid;
pub mod processor;
pub mod raster;
pub mod record;
pub mod scheduler;
pub mod surface_cpu;
pub mod video;

pub use animation::{AnimationLoop, LoopState};
pub use encode_ffmpeg::{EncodeConfig, FfmpegEncoder, default_mp4_config};
pub use error::{EmosaicError, EmosaicResult};
pub use frame::FrameRgba;
pub use grid::{CellSize, Resolution, SurfaceSize, cell_size, grid_points};
pub use processor::{DARK_THRESHOLD, FrameProcessor, MosaicOutcome};
pub use raster::{BACKGROUND_RGBA, RenderTarget, Rasterizer};
pub use record::{FrameSink, PngSequenceSink, RecordingTarget};
pub use scheduler::{CountedScheduler, FrameScheduler, RefreshScheduler};
pub use surface_cpu::CpuSurface;
pub use video::{FfmpegVideoSource, VideoMetadata, VideoSource, probe_video};
