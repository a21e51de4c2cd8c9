//! Scaling of grid cells to pixel rectangles.
//!
//! When the viewport is not a multiple of the grid size, the remainder is
//! handed out one pixel at a time to the leading columns (and rows), so the
//! scaled cells of a grid always tile the viewport exactly.

use crate::geometry::{GridCell, Rectangle};

/// Offset and length along one axis for a run of `span` cells starting at
/// `start` in a grid of `cells` cells over `length` pixels.
///
/// The run is clipped to the grid.  Both results lie in `0..=length`.
fn axis(start: u32, span: u32, cells: u32, length: i32) -> (i32, i32) {
    let cells = i64::from(cells.max(1));
    let length = i64::from(length);
    let start = i64::from(start).min(cells);
    let span = i64::from(span).min(cells - start);
    let factor = length / cells;
    let rem = length % cells;
    // Extra pixels already consumed by the cells before `start`.
    let adjust = start.min(rem);
    let extra = ((start + span).min(rem) - adjust).max(0);
    (
        pixels(factor * start + adjust),
        pixels(factor * span + extra),
    )
}

fn pixels(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Scale `cell` to a `viewport_width × viewport_height` viewport.
///
/// Negative viewport sizes are treated as zero.
pub fn scale(cell: GridCell, viewport_width: i32, viewport_height: i32) -> Rectangle {
    let vw = viewport_width.max(0);
    let vh = viewport_height.max(0);
    let (x, width) = axis(cell.x, cell.width, cell.grid_cols, vw);
    let (y, height) = axis(cell.y, cell.height, cell.grid_rows, vh);
    Rectangle {
        x,
        y,
        width,
        height,
        max_width: vw,
        max_height: vh,
    }
}

/// Scale every cell, preserving order.
pub fn scale_all(cells: &[GridCell], viewport_width: i32, viewport_height: i32) -> Vec<Rectangle> {
    cells
        .iter()
        .map(|c| scale(*c, viewport_width, viewport_height))
        .collect()
}

//  Tests
