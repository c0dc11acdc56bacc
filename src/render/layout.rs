//! Cell geometry: maps grid cells onto the canvas.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::score::CompileTimeConfig;

/// How the canvas is divided into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CellSizing {
    /// Integer division; any remainder is left as an unrendered margin.
    #[default]
    Floor,
    /// The canvas must divide evenly into cells.
    Exact,
}

/// Layout section of the player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub sizing: CellSizing,
    /// Gap left between neighbouring cells, in canvas pixels.
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
}

fn default_frame_width() -> u32 {
    1
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sizing: CellSizing::default(),
            frame_width: default_frame_width(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("canvas {axis} of {canvas}px does not divide into {cells} cells")]
    UnevenCanvas {
        axis: &'static str,
        canvas: u32,
        cells: u32,
    },
    #[error("cells of {size}px leave no room inside a {frame}px frame")]
    CellTooSmall { size: u32, frame: u32 },
}

/// A pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Per-cell pixel geometry for one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    cols: u32,
    rows: u32,
    cell_w: u32,
    cell_h: u32,
    frame: u32,
}

impl CellLayout {
    pub fn new(config: &CompileTimeConfig, layout: &LayoutConfig) -> Result<Self, LayoutError> {
        let cell_w = divide("width", config.canvas_w, config.grid_cols, layout.sizing)?;
        let cell_h = divide("height", config.canvas_h, config.grid_rows, layout.sizing)?;
        let frame = layout.frame_width;
        for size in [cell_w, cell_h] {
            if size <= frame {
                return Err(LayoutError::CellTooSmall { size, frame });
            }
        }
        Ok(Self {
            cols: config.grid_cols,
            rows: config.grid_rows,
            cell_w,
            cell_h,
            frame,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Pitch of the cell grid (cell plus frame), in pixels.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_w, self.cell_h)
    }

    /// The drawable rectangle of a cell, or `None` outside the grid.
    pub fn rect(&self, cell: usize) -> Option<Rect> {
        if cell >= self.cell_count() {
            return None;
        }
        let col = cell as u32 % self.cols;
        let row = cell as u32 / self.cols;
        Some(Rect {
            x: col * self.cell_w,
            y: row * self.cell_h,
            w: self.cell_w - self.frame,
            h: self.cell_h - self.frame,
        })
    }
}

fn divide(axis: &'static str, canvas: u32, cells: u32, sizing: CellSizing) -> Result<u32, LayoutError> {
    if sizing == CellSizing::Exact && canvas % cells != 0 {
        return Err(LayoutError::UnevenCanvas {
            axis,
            canvas,
            cells,
        });
    }
    Ok(canvas / cells)
}
