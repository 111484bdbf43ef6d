use crate::error::{EmosaicError, EmosaicResult};

/// Glyph-grid density requested by the caller: columns x rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub columns: u32,
    pub rows: u32,
}

impl Resolution {
    pub fn new(columns: u32, rows: u32) -> EmosaicResult<Self> {
        if columns == 0 || rows == 0 {
            return Err(EmosaicError::validation(
                "resolution columns/rows must be > 0",
            ));
        }
        Ok(Self { columns, rows })
    }
}

/// Pixel size of the raster surface. Fixed once video metadata arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };
}

/// One sampling cell in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// A zero step on either axis; happens when the requested resolution
    /// exceeds the surface pixel size.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Floor division per axis. Degenerate (zero) results are not an error here;
/// the mosaic pass decides what to do with them.
pub fn cell_size(surface: SurfaceSize, resolution: Resolution) -> CellSize {
    CellSize {
        width: surface.width / resolution.columns,
        height: surface.height / resolution.rows,
    }
}

/// Row-major walk over the grid-aligned sample points of a surface:
/// y = 0, ch, 2ch, … < height; x = 0, cw, 2cw, … < width.
///
/// Each in-bounds point is visited exactly once. A degenerate cell yields an
/// empty walk rather than a non-advancing one.
#[derive(Clone, Debug)]
pub struct GridWalk {
    surface: SurfaceSize,
    cell: CellSize,
    x: u32,
    y: u32,
}

pub fn grid_points(surface: SurfaceSize, cell: CellSize) -> GridWalk {
    GridWalk {
        surface,
        cell,
        x: 0,
        y: 0,
    }
}

impl Iterator for GridWalk {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.cell.is_degenerate() {
            return None;
        }
        if self.y >= self.surface.height || self.x >= self.surface.width {
            return None;
        }
        let point = (self.x, self.y);
        self.x += self.cell.width;
        if self.x >= self.surface.width {
            self.x = 0;
            self.y += self.cell.height;
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_rejects_zero() {
        assert!(Resolution::new(0, 15).is_err());
        assert!(Resolution::new(15, 0).is_err());
        assert!(Resolution::new(15, 15).is_ok());
    }

    #[test]
    fn cell_size_is_floor_division() {
        let cell = cell_size(
            SurfaceSize {
                width: 300,
                height: 300,
            },
            Resolution::new(15, 15).unwrap(),
        );
        assert_eq!(
            cell,
            CellSize {
                width: 20,
                height: 20
            }
        );

        let cell = cell_size(
            SurfaceSize {
                width: 100,
                height: 70,
            },
            Resolution::new(30, 30).unwrap(),
        );
        assert_eq!(
            cell,
            CellSize {
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn cell_size_degenerates_silently_when_resolution_exceeds_surface() {
        let cell = cell_size(
            SurfaceSize {
                width: 10,
                height: 10,
            },
            Resolution::new(20, 20).unwrap(),
        );
        assert_eq!(
            cell,
            CellSize {
                width: 0,
                height: 0
            }
        );
        assert!(cell.is_degenerate());
    }

    #[test]
    fn grid_walk_covers_every_point_exactly_once() {
        let surface = SurfaceSize {
            width: 10,
            height: 6,
        };
        let cell = CellSize {
            width: 4,
            height: 3,
        };

        let points: Vec<(u32, u32)> = grid_points(surface, cell).collect();
        assert_eq!(points, vec![(0, 0), (4, 0), (8, 0), (0, 3), (4, 3), (8, 3)]);
    }

    #[test]
    fn grid_walk_is_row_major() {
        let surface = SurfaceSize {
            width: 4,
            height: 4,
        };
        let cell = CellSize {
            width: 2,
            height: 2,
        };
        let points: Vec<(u32, u32)> = grid_points(surface, cell).collect();
        assert_eq!(points, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
    }

    #[test]
    fn grid_walk_with_zero_step_is_empty() {
        let surface = SurfaceSize {
            width: 10,
            height: 10,
        };
        assert_eq!(
            grid_points(
                surface,
                CellSize {
                    width: 0,
                    height: 3
                }
            )
            .count(),
            0
        );
        assert_eq!(
            grid_points(
                surface,
                CellSize {
                    width: 3,
                    height: 0
                }
            )
            .count(),
            0
        );
    }

    #[test]
    fn grid_walk_on_empty_surface_is_empty() {
        assert_eq!(
            grid_points(
                SurfaceSize::ZERO,
                CellSize {
                    width: 2,
                    height: 2
                }
            )
            .count(),
            0
        );
    }
}
