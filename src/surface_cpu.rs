use crate::{
    error::{EmosaicError, EmosaicResult},
    frame::FrameRgba,
    grid::SurfaceSize,
    raster::RenderTarget,
};

const APPLE_BODY_RGBA: [u8; 4] = [211, 47, 47, 255];
const APPLE_STEM_RGBA: [u8; 4] = [109, 76, 47, 255];

/// In-memory straight-RGBA8 surface, row-major, tightly packed.
///
/// The glyph primitive stamps a fixed procedural apple (round body plus a
/// short stem) instead of going through a font stack; the mosaic only ever
/// draws this one symbol.
pub struct CpuSurface {
    size: SurfaceSize,
    data: Vec<u8>,
}

impl CpuSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            data: vec![0u8; (size.width as usize) * (size.height as usize) * 4],
        }
    }

    fn put_pixel(&mut self, x: i64, y: i64, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= i64::from(self.size.width) || y >= i64::from(self.size.height) {
            return;
        }
        let i = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

impl RenderTarget for CpuSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> EmosaicResult<()> {
        self.size = size;
        self.data = vec![0u8; (size.width as usize) * (size.height as usize) * 4];
        Ok(())
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        let x1 = x.min(self.size.width) as usize;
        let y1 = y.min(self.size.height) as usize;
        let x2 = x.saturating_add(width).min(self.size.width) as usize;
        let y2 = y.saturating_add(height).min(self.size.height) as usize;

        let stride = self.size.width as usize * 4;
        for row in y1..y2 {
            let start = row * stride;
            for col in x1..x2 {
                let i = start + col * 4;
                self.data[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }

    fn draw_image(&mut self, frame: &FrameRgba) -> EmosaicResult<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(EmosaicError::render("cannot draw an empty source frame"));
        }
        let (dw, dh) = (self.size.width as usize, self.size.height as usize);
        let (sw, sh) = (frame.width as usize, frame.height as usize);

        // Nearest-neighbor scale of the source frame over the full bounds.
        for dy in 0..dh {
            let sy = dy * sh / dh;
            let src_row = sy * sw * 4;
            let dst_row = dy * dw * 4;
            for dx in 0..dw {
                let sx = dx * sw / dw;
                let si = src_row + sx * 4;
                let di = dst_row + dx * 4;
                self.data[di..di + 4].copy_from_slice(&frame.data[si..si + 4]);
            }
        }
        Ok(())
    }

    fn read_pixels(&mut self) -> EmosaicResult<FrameRgba> {
        FrameRgba::new(self.size.width, self.size.height, self.data.clone())
    }

    fn draw_glyph(&mut self, x: u32, y: u32, size_px: u32) {
        if size_px == 0 {
            return;
        }
        let s = size_px as f32;
        let (cx, cy) = (x as f32, y as f32);

        // Round body, slightly below center so the stem fits above it.
        let body_cy = cy + 0.08 * s;
        let radius = 0.42 * s;
        let stem_half_width = (s / 16.0).max(0.5);

        let half = (size_px as i64) / 2 + 1;
        for py in i64::from(y) - half..=i64::from(y) + half {
            for px in i64::from(x) - half..=i64::from(x) + half {
                let (fx, fy) = (px as f32, py as f32);

                let dx = fx - cx;
                let dy = fy - body_cy;
                if dx * dx + dy * dy <= radius * radius {
                    self.put_pixel(px, py, APPLE_BODY_RGBA);
                    continue;
                }

                if (fx - cx).abs() <= stem_half_width
                    && fy >= cy - 0.5 * s
                    && fy <= cy - 0.3 * s
                {
                    self.put_pixel(px, py, APPLE_STEM_RGBA);
                }
            }
        }
    }
}
