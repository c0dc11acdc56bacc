//! Render surfaces: where cell colors end up.
//!
//! Engines only write cell fills. Presenting a frame is up to whoever
//! drives the clock, after all engines have handled their ticks.

pub mod layout;
pub mod terminal;

pub use layout::{CellLayout, CellSizing, LayoutConfig, LayoutError, Rect};
pub use terminal::TerminalSurface;

use std::io;

use crate::score::Rgb;

/// A surface holding one color per grid cell.
pub trait RenderSurface {
    /// Set the fill color of a cell (`row * grid_cols + col`).
    fn fill_cell(&mut self, cell: usize, color: Rgb);

    /// Make the current fills visible.
    fn present(&mut self) -> io::Result<()>;
}
