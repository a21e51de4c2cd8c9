//! Geometry value types shared by every stage of the engine.
//!
//! A [`GridCell`] is a region expressed in grid units, as written in a grid
//! spec.  A [`Rectangle`] is a region in pixels together with the viewport it
//! was scaled against.  Both are plain `Copy` values.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A rectangular region of a grid, before scaling.
///
/// `x`/`y` are the top-left cell indices, `width`/`height` the span in
/// cells, and `grid_cols`/`grid_rows` the size of the grid the cell lives in.
/// The parser guarantees `x + width <= grid_cols` and
/// `y + height <= grid_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub grid_cols: u32,
    pub grid_rows: u32,
}

impl GridCell {
    /// A single unit cell at `(x, y)` in a `cols × rows` grid.
    pub fn unit(x: u32, y: u32, grid_cols: u32, grid_rows: u32) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
            grid_cols,
            grid_rows,
        }
    }
}

/// A pixel rectangle and the viewport (`max_width × max_height`) it was
/// computed for.
///
/// Equality compares all six fields, so the same position scaled against a
/// different viewport is a different rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32, max_width: i32, max_height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            max_width,
            max_height,
        }
    }

    /// Shift the rectangle by `(dx, dy)`, keeping its size and viewport.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Same position and size, measured against another viewport.
    pub fn with_viewport(&self, max_width: i32, max_height: i32) -> Self {
        Self {
            max_width,
            max_height,
            ..*self
        }
    }

    /// The position and size handed to a window manager.
    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Extra pixels a window's reported rectangle extends beyond its visible
/// rectangle on each side.
///
/// Values may be negative when decorations are drawn *outside* the reported
/// rectangle (for example compositor borders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChromeOffset {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ChromeOffset {
    /// The same offset on all four sides.
    pub fn uniform(px: i32) -> Self {
        Self {
            left: px,
            top: px,
            right: px,
            bottom: px,
        }
    }
}

/// Grow a visible rectangle into the rectangle the window manager expects.
impl Add<ChromeOffset> for Rectangle {
    type Output = Rectangle;

    fn add(self, o: ChromeOffset) -> Rectangle {
        Rectangle {
            x: self.x - o.left,
            y: self.y - o.top,
            width: self.width + o.left + o.right,
            height: self.height + o.top + o.bottom,
            ..self
        }
    }
}

/// Strip the chrome back off a reported rectangle.
impl Sub<ChromeOffset> for Rectangle {
    type Output = Rectangle;

    fn sub(self, o: ChromeOffset) -> Rectangle {
        Rectangle {
            x: self.x + o.left,
            y: self.y + o.top,
            width: self.width - o.left - o.right,
            height: self.height - o.top - o.bottom,
            ..self
        }
    }
}

/// The region of a monitor available to windows, in global logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Final position and size sent to the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

//  Tests
