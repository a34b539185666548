//! Glyphgrid Core - character-grid surface model
//!
//! This crate provides the data structures and algorithms behind a glyph
//! surface:
//! - Cells with separate desired and actual appearance
//! - A fixed-size cell surface with print, fill, copy, shift and resize
//! - Time-driven cell effects and the table binding them to cells
//! - Colored strings, render snapshots and persisted surface state
//!
//! Nothing here renders. Renderers read the actual appearance of each cell
//! after `CellSurface::update_effects` has run for the frame.
//!
//! The model is single threaded: effect handles are reference counted and
//! not `Send`.

mod bindings;
mod cell;
mod color;
mod colored_string;
pub mod effect;
mod error;
mod gradient;
mod persist;
mod snapshot;
mod surface;

use serde::{Deserialize, Serialize};

pub use bindings::EffectBindings;
pub use cell::{Appearance, Cell, Mirror};
pub use color::{Color, ParseColorError};
pub use colored_string::{ColoredGlyph, ColoredString};
pub use effect::{
    CellEffect, DynEffect, EffectHandle, EffectId, EffectRegistry, SerializedEffect, Sharing,
};
pub use error::{Error, Result};
pub use gradient::{ColorGradient, GradientStop};
pub use persist::{BoundEffectState, SurfaceState};
pub use snapshot::{ColorSpan, Snapshot, SnapshotRow};
pub use surface::CellSurface;

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row-major index on a surface `width` cells wide
    pub fn to_index(self, width: usize) -> usize {
        self.y * width + self.x
    }

    /// Inverse of [`Point::to_index`]; `width` must be non-zero
    pub fn from_index(index: usize, width: usize) -> Self {
        Self {
            x: index % width,
            y: index / width,
        }
    }
}

/// A rectangular area of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Points in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let Rect {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height).flat_map(move |row| (x..x + width).map(move |col| Point::new(col, row)))
    }
}
