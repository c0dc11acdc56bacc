//! Terminal surface: draws the cell grid with 24-bit ANSI colors.
//!
//! Canvas pixels are scaled to character cells, so a cell's frame gap shows
//! up once the canvas is large enough.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use super::{CellLayout, RenderSurface};
use crate::score::Rgb;

/// Canvas pixels covered by one terminal character.
pub const CHAR_W_PX: u32 = 8;
pub const CHAR_H_PX: u32 = 16;

const FULL_BLOCK: &str = "█";

pub struct TerminalSurface<W: Write> {
    out: W,
    layout: CellLayout,
    cells: Vec<Rgb>,
}

impl TerminalSurface<Stdout> {
    pub fn stdout(layout: CellLayout) -> Self {
        Self::new(io::stdout(), layout)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, layout: CellLayout) -> Self {
        Self {
            out,
            cells: vec![Rgb::BLACK; layout.cell_count()],
            layout,
        }
    }

    /// Switch to the alternate screen and hide the cursor.
    pub fn begin(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )
    }

    /// Restore the normal screen.
    pub fn end(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)
    }

    pub fn cell(&self, cell: usize) -> Option<Rgb> {
        self.cells.get(cell).copied()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn fill_cell(&mut self, cell: usize, color: Rgb) {
        if let Some(slot) = self.cells.get_mut(cell) {
            *slot = color;
        }
    }

    fn present(&mut self) -> io::Result<()> {
        for (idx, color) in self.cells.iter().enumerate() {
            let Some(rect) = self.layout.rect(idx) else {
                continue;
            };
            // Cells whose origin is past the addressable terminal are not drawn.
            let (Ok(x), Ok(y)) = (
                u16::try_from(rect.x / CHAR_W_PX),
                u16::try_from(rect.y / CHAR_H_PX),
            ) else {
                continue;
            };
            let w = usize::from(char_span(rect.w, CHAR_W_PX));
            let h = char_span(rect.h, CHAR_H_PX);

            // Black cells are left blank.
            let glyph = if *color == Rgb::BLACK { " " } else { FULL_BLOCK };
            let line = glyph.repeat(w);
            queue!(
                self.out,
                SetForegroundColor(Color::Rgb {
                    r: color.r,
                    g: color.g,
                    b: color.b,
                })
            )?;
            for dy in 0..h {
                let Some(row) = y.checked_add(dy) else {
                    break;
                };
                queue!(self.out, cursor::MoveTo(x, row), Print(&line))?;
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

/// Characters spanned by `px` pixels: at least one, at most `u16::MAX`.
fn char_span(px: u32, per_char: u32) -> u16 {
    u16::try_from((px / per_char).max(1)).unwrap_or(u16::MAX)
}
