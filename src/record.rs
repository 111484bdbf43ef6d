use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    error::{EmosaicError, EmosaicResult},
    frame::FrameRgba,
    grid::SurfaceSize,
    raster::RenderTarget,
};

/// Where finished mosaic frames go once a cycle presents them.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &FrameRgba) -> EmosaicResult<()>;

    /// Flush pending output. Called once, after the loop stops.
    fn finish(&mut self) -> EmosaicResult<()> {
        Ok(())
    }
}

/// Writes each presented frame as a numbered PNG in a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    frame_index: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> EmosaicResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        Ok(Self {
            dir,
            frame_index: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frame_index
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &FrameRgba) -> EmosaicResult<()> {
        let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| EmosaicError::render("frame buffer does not match its dimensions"))?;
        let path = self.dir.join(format!("frame_{:05}.png", self.frame_index));
        img.save(&path)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.frame_index += 1;
        Ok(())
    }
}

/// Display adapter for headless runs: wraps a surface and forwards every
/// presented cycle to a sink. The raster stays the single visible output,
/// the sink is where "visible" goes.
pub struct RecordingTarget<T: RenderTarget, S: FrameSink> {
    inner: T,
    sink: S,
}

impl<T: RenderTarget, S: FrameSink> RecordingTarget<T, S> {
    pub fn new(inner: T, sink: S) -> Self {
        Self { inner, sink }
    }
}

impl<T: RenderTarget, S: FrameSink> RenderTarget for RecordingTarget<T, S> {
    fn size(&self) -> SurfaceSize {
        self.inner.size()
    }

    fn resize(&mut self, size: SurfaceSize) -> EmosaicResult<()> {
        self.inner.resize(size)
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        self.inner.fill_rect(x, y, width, height, rgba);
    }

    fn draw_image(&mut self, frame: &FrameRgba) -> EmosaicResult<()> {
        self.inner.draw_image(frame)
    }

    fn read_pixels(&mut self) -> EmosaicResult<FrameRgba> {
        self.inner.read_pixels()
    }

    fn draw_glyph(&mut self, x: u32, y: u32, size_px: u32) {
        self.inner.draw_glyph(x, y, size_px);
    }

    fn present(&mut self) -> EmosaicResult<()> {
        let frame = self.inner.read_pixels()?;
        self.sink.write_frame(&frame)?;
        self.inner.present()
    }

    fn finish(&mut self) -> EmosaicResult<()> {
        self.sink.finish()?;
        self.inner.finish()
    }
}
