use crate::{
    error::EmosaicResult,
    grid::{CellSize, SurfaceSize, grid_points},
    raster::Rasterizer,
};

/// Red-channel values below this count as "dark" and get a glyph.
pub const DARK_THRESHOLD: u8 = 200;

/// Result of one mosaic pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MosaicOutcome {
    Completed { glyphs_drawn: usize },
    /// The cell size had a zero axis, so the pass was skipped without
    /// touching the surface. See [`CellSize::is_degenerate`].
    SkippedDegenerateGrid,
}

/// The thresholding/mosaic algorithm. Holds no state between cycles; every
/// pass is a pure function of the captured pixel buffer and the cell size.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameProcessor;

impl FrameProcessor {
    pub fn new() -> Self {
        Self
    }

    /// One mosaic pass: capture the surface pixels, erase the surface, then
    /// walk the grid and stamp a glyph on every dark cell.
    ///
    /// Only the red channel is sampled, as a luminance proxy. The source
    /// material this effect targets is black/white/red, so a perceptual
    /// grayscale conversion would change nothing visible.
    #[tracing::instrument(skip(self, raster))]
    pub fn process(&self, raster: &mut Rasterizer, cell: CellSize) -> EmosaicResult<MosaicOutcome> {
        if cell.is_degenerate() {
            return Ok(MosaicOutcome::SkippedDegenerateGrid);
        }

        let pixels = raster.read_pixels()?;
        let surface = SurfaceSize {
            width: pixels.width,
            height: pixels.height,
        };

        raster.clear();

        let mut glyphs_drawn = 0;
        for (x, y) in grid_points(surface, cell) {
            let red = pixels.data[pixels.byte_index(x, y)];
            if is_dark(red) {
                // Glyph size follows the cell width; overflow on the height
                // axis is accepted.
                raster.draw_glyph(x, y, cell.width);
                glyphs_drawn += 1;
            }
        }

        tracing::debug!(glyphs_drawn, "mosaic pass done");
        Ok(MosaicOutcome::Completed { glyphs_drawn })
    }
}

/// The threshold rule: strict `red < 200`.
pub fn is_dark(red: u8) -> bool {
    red < DARK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::EmosaicResult,
        frame::FrameRgba,
        raster::{RenderTarget, Rasterizer},
    };
    use std::{cell::RefCell, rc::Rc};

    /// Records the operations the mosaic pass issues instead of rasterizing.
    #[derive(Clone, Default)]
    struct OpLog {
        glyphs: Rc<RefCell<Vec<(u32, u32, u32)>>>,
        clears: Rc<RefCell<usize>>,
    }

    struct ScriptedTarget {
        pixels: FrameRgba,
        log: OpLog,
    }

    impl RenderTarget for ScriptedTarget {
        fn size(&self) -> SurfaceSize {
            SurfaceSize {
                width: self.pixels.width,
                height: self.pixels.height,
            }
        }

        fn resize(&mut self, _size: SurfaceSize) -> EmosaicResult<()> {
            unreachable!("mosaic pass never resizes")
        }

        fn fill_rect(&mut self, _x: u32, _y: u32, _w: u32, _h: u32, _rgba: [u8; 4]) {
            *self.log.clears.borrow_mut() += 1;
        }

        fn draw_image(&mut self, _frame: &FrameRgba) -> EmosaicResult<()> {
            Ok(())
        }

        fn read_pixels(&mut self) -> EmosaicResult<FrameRgba> {
            Ok(self.pixels.clone())
        }

        fn draw_glyph(&mut self, x: u32, y: u32, size_px: u32) {
            self.log.glyphs.borrow_mut().push((x, y, size_px));
        }
    }

    fn run_pass(pixels: FrameRgba, cell: CellSize) -> (MosaicOutcome, OpLog) {
        let log = OpLog::default();
        let mut raster = Rasterizer::new(Box::new(ScriptedTarget {
            pixels,
            log: log.clone(),
        }));
        let outcome = FrameProcessor::new().process(&mut raster, cell).unwrap();
        (outcome, log)
    }

    fn frame_with_red(width: u32, height: u32, red: u8) -> FrameRgba {
        FrameRgba::solid(width, height, [red, 0, 0, 255])
    }

    #[test]
    fn threshold_is_strictly_below_200() {
        assert!(is_dark(0));
        assert!(is_dark(199));
        assert!(!is_dark(200));
        assert!(!is_dark(255));
    }

    #[test]
    fn boundary_red_values_drive_glyph_decision() {
        let cell = CellSize {
            width: 2,
            height: 2,
        };

        let (_, log) = run_pass(frame_with_red(2, 2, 199), cell);
        assert_eq!(log.glyphs.borrow().len(), 1);

        let (_, log) = run_pass(frame_with_red(2, 2, 200), cell);
        assert_eq!(log.glyphs.borrow().len(), 0);
    }

    #[test]
    fn dark_frame_fills_the_whole_grid() {
        let cell = CellSize {
            width: 4,
            height: 4,
        };
        let (outcome, log) = run_pass(frame_with_red(12, 12, 100), cell);

        assert_eq!(outcome, MosaicOutcome::Completed { glyphs_drawn: 9 });
        let glyphs = log.glyphs.borrow();
        for y in [0u32, 4, 8] {
            for x in [0u32, 4, 8] {
                assert!(glyphs.contains(&(x, y, 4)), "missing glyph at ({x},{y})");
            }
        }
    }

    #[test]
    fn light_frame_draws_nothing_but_still_clears() {
        let cell = CellSize {
            width: 4,
            height: 4,
        };
        let (outcome, log) = run_pass(frame_with_red(12, 12, 255), cell);

        assert_eq!(outcome, MosaicOutcome::Completed { glyphs_drawn: 0 });
        assert!(log.glyphs.borrow().is_empty());
        assert_eq!(*log.clears.borrow(), 1);
    }

    #[test]
    fn pass_is_deterministic_for_a_fixed_buffer() {
        let mut frame = frame_with_red(16, 16, 255);
        // Darken an arbitrary scatter of pixels.
        for (x, y) in [(0, 0), (8, 4), (12, 12), (4, 8)] {
            let i = frame.byte_index(x, y);
            frame.data[i] = 10;
        }
        let cell = CellSize {
            width: 4,
            height: 4,
        };

        let (_, first) = run_pass(frame.clone(), cell);
        let (_, second) = run_pass(frame, cell);
        assert_eq!(*first.glyphs.borrow(), *second.glyphs.borrow());
    }

    #[test]
    fn sampling_uses_only_the_red_channel() {
        let cell = CellSize {
            width: 2,
            height: 2,
        };
        // Green/blue fully bright, red dark: still a glyph.
        let frame = FrameRgba::solid(2, 2, [0, 255, 255, 255]);
        let (_, log) = run_pass(frame, cell);
        assert_eq!(log.glyphs.borrow().len(), 1);
    }

    #[test]
    fn degenerate_cell_skips_without_touching_the_surface() {
        let (outcome, log) = run_pass(
            frame_with_red(10, 10, 0),
            CellSize {
                width: 0,
                height: 5,
            },
        );
        assert_eq!(outcome, MosaicOutcome::SkippedDegenerateGrid);
        assert!(log.glyphs.borrow().is_empty());
        assert_eq!(*log.clears.borrow(), 0);
    }
}
