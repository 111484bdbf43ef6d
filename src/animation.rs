use crate::{
    error::{EmosaicError, EmosaicResult},
    grid::{CellSize, Resolution, SurfaceSize, cell_size},
    processor::FrameProcessor,
    raster::Rasterizer,
    scheduler::FrameScheduler,
    video::VideoSource,
};

/// Lifecycle of the animation loop. There is no terminal state; a running
/// loop keeps cycling until its scheduler stops granting ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    WaitingForVideoMetadata,
    Running,
}

/// Drives the per-frame cycle: draw the decoded source frame into the
/// raster, run the mosaic pass over it, present, reschedule.
///
/// All collaborators are injected, so several loops can coexist in one
/// process and tests can run with fake sources and schedulers.
pub struct AnimationLoop {
    resolution: Resolution,
    video: Box<dyn VideoSource>,
    raster: Rasterizer,
    processor: FrameProcessor,
    scheduler: Box<dyn FrameScheduler>,
    state: LoopState,
    cell: Option<CellSize>,
}

impl AnimationLoop {
    pub fn new(
        resolution: Resolution,
        video: Box<dyn VideoSource>,
        raster: Rasterizer,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        Self {
            resolution,
            video,
            raster,
            processor: FrameProcessor::new(),
            scheduler,
            state: LoopState::Uninitialized,
            cell: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The cell size in effect, once the surface has been sized.
    pub fn cell(&self) -> Option<CellSize> {
        self.cell
    }

    /// Begin muted playback. A start failure is fatal: the loop stays out of
    /// its running state and there is no retry.
    pub fn start(&mut self) -> EmosaicResult<()> {
        if self.state != LoopState::Uninitialized {
            return Err(EmosaicError::validation("animation loop already started"));
        }
        self.video.start()?;
        self.state = LoopState::WaitingForVideoMetadata;
        Ok(())
    }

    /// Run until the scheduler stops granting ticks, then flush the display
    /// pipeline. Starts playback first if the caller has not.
    pub fn run(&mut self) -> EmosaicResult<()> {
        if self.state == LoopState::Uninitialized {
            self.start()?;
        }
        while self.scheduler.next_tick() {
            self.step()?;
        }
        self.raster.finish()
    }

    /// One scheduler tick worth of work.
    pub fn step(&mut self) -> EmosaicResult<()> {
        match self.state {
            LoopState::Uninitialized => Err(EmosaicError::validation(
                "step() before the animation loop was started",
            )),
            LoopState::WaitingForVideoMetadata => {
                let Some(meta) = self.video.poll_metadata() else {
                    // Metadata has not arrived; this refresh slot passes idle.
                    return Ok(());
                };

                let surface = SurfaceSize {
                    width: meta.width,
                    height: meta.height,
                };
                self.raster.resize(surface)?;

                // Computed exactly once per session.
                let cell = cell_size(surface, self.resolution);
                if cell.is_degenerate() {
                    tracing::warn!(
                        ?cell,
                        ?surface,
                        "requested resolution exceeds the surface; mosaic passes will be skipped"
                    );
                }
                tracing::debug!(?surface, ?cell, "surface sized from video metadata");
                self.cell = Some(cell);
                self.state = LoopState::Running;

                // First visible frame lands on the same tick the metadata
                // arrived, matching play-then-run startup.
                self.cycle()
            }
            LoopState::Running => self.cycle(),
        }
    }

    fn cycle(&mut self) -> EmosaicResult<()> {
        let Some(cell) = self.cell else {
            return Err(EmosaicError::validation(
                "running cycle without a computed cell size",
            ));
        };

        self.raster.clear();
        let frame = self.video.current_frame()?;
        self.raster.draw_source_frame(&frame)?;
        self.processor.process(&mut self.raster, cell)?;
        self.raster.present()
    }
}
