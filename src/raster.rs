use crate::{
    error::EmosaicResult,
    frame::FrameRgba,
    grid::SurfaceSize,
};

/// Background painted by [`Rasterizer::clear`]: opaque white.
pub const BACKGROUND_RGBA: [u8; 4] = [255, 255, 255, 255];

/// The raster/display surface the pipeline draws into. The same buffer is
/// both scratch space for sampling and the visible output.
///
/// Glyphs are always anchored centered/middle on the given point; there is
/// no mutable text-alignment state to reset between passes.
pub trait RenderTarget {
    fn size(&self) -> SurfaceSize;

    /// Set the surface pixel size. Called exactly once per session, when the
    /// video source reports its native decoded dimensions.
    fn resize(&mut self, size: SurfaceSize) -> EmosaicResult<()>;

    /// Fill a rectangle with a solid color, clipped to the surface.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]);

    /// Scale-copy a source frame over the full surface bounds.
    fn draw_image(&mut self, frame: &FrameRgba) -> EmosaicResult<()>;

    /// Snapshot of the full surface as straight RGBA8, row-major. Must
    /// reflect every prior write in this cycle.
    fn read_pixels(&mut self) -> EmosaicResult<FrameRgba>;

    /// Draw the fixed apple glyph centered at (x, y) with the given font
    /// size in pixels.
    fn draw_glyph(&mut self, x: u32, y: u32, size_px: u32);

    /// End-of-cycle hook: the finished mosaic frame is ready for display.
    fn present(&mut self) -> EmosaicResult<()> {
        Ok(())
    }

    /// Flush hook, called once after the animation loop stops.
    fn finish(&mut self) -> EmosaicResult<()> {
        Ok(())
    }
}

/// Owns the pixel surface and mediates all reads and writes to it.
pub struct Rasterizer {
    target: Box<dyn RenderTarget>,
}

impl Rasterizer {
    pub fn new(target: Box<dyn RenderTarget>) -> Self {
        Self { target }
    }

    pub fn size(&self) -> SurfaceSize {
        self.target.size()
    }

    pub fn resize(&mut self, size: SurfaceSize) -> EmosaicResult<()> {
        self.target.resize(size)
    }

    /// Erase the whole surface to the opaque white background. Must run
    /// before every mosaic redraw so prior glyph marks do not accumulate.
    pub fn clear(&mut self) {
        let size = self.target.size();
        self.target
            .fill_rect(0, 0, size.width, size.height, BACKGROUND_RGBA);
    }

    /// Scale-copy the current decoded video frame into the full surface.
    pub fn draw_source_frame(&mut self, frame: &FrameRgba) -> EmosaicResult<()> {
        self.target.draw_image(frame)
    }

    pub fn read_pixels(&mut self) -> EmosaicResult<FrameRgba> {
        self.target.read_pixels()
    }

    pub fn draw_glyph(&mut self, x: u32, y: u32, size_px: u32) {
        self.target.draw_glyph(x, y, size_px);
    }

    pub fn present(&mut self) -> EmosaicResult<()> {
        self.target.present()
    }

    pub fn finish(&mut self) -> EmosaicResult<()> {
        self.target.finish()
    }
}
