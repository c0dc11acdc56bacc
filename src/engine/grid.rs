//! Per-engine cell state: fill colors and the active-note table.

use crate::score::{NoteParams, Rgb};

/// Fill colors of every cell, indexed `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: u32,
    rows: u32,
    cells: Vec<Rgb>,
}

impl Grid {
    /// A grid with every cell black.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Rgb::BLACK; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell: usize) -> Option<Rgb> {
        self.cells.get(cell).copied()
    }

    pub fn fill(&mut self, cell: usize, color: Rgb) {
        if let Some(slot) = self.cells.get_mut(cell) {
            *slot = color;
        }
    }

    pub fn cells(&self) -> &[Rgb] {
        &self.cells
    }
}

/// The note currently sounding for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRecord {
    pub pitch: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl From<NoteParams> for NoteRecord {
    fn from(p: NoteParams) -> Self {
        Self {
            pitch: p.pitch,
            velocity: p.velocity,
            channel: p.channel,
        }
    }
}

/// At most one active note per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTable {
    records: Vec<Option<NoteRecord>>,
}

impl NoteTable {
    pub fn new(cells: usize) -> Self {
        Self {
            records: vec![None; cells],
        }
    }

    pub fn get(&self, cell: usize) -> Option<NoteRecord> {
        self.records.get(cell).copied().flatten()
    }

    /// Record a note for a cell, replacing whatever was tracked before.
    pub fn set(&mut self, cell: usize, record: NoteRecord) -> Option<NoteRecord> {
        self.records.get_mut(cell).and_then(|slot| slot.replace(record))
    }

    /// Clear a cell's record, returning it.
    pub fn take(&mut self, cell: usize) -> Option<NoteRecord> {
        self.records.get_mut(cell).and_then(Option::take)
    }

    /// Clear every record, returning `(cell, record)` for each active one.
    pub fn drain(&mut self) -> Vec<(usize, NoteRecord)> {
        self.records
            .iter_mut()
            .enumerate()
            .filter_map(|(cell, slot)| slot.take().map(|r| (cell, r)))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: NoteRecord = NoteRecord {
        pitch: 60,
        velocity: 100,
        channel: 1,
    };

    #[test]
    fn new_grid_is_black() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.len(), 6);
        assert!(grid.cells().iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    fn fill_ignores_out_of_range() {
        let mut grid = Grid::new(1, 1);
        grid.fill(3, Rgb::new(1, 1, 1));
        assert_eq!(grid.get(3), None);
    }

    #[test]
    fn set_overwrites_stale_record() {
        let mut notes = NoteTable::new(2);
        assert_eq!(notes.set(1, NOTE), None);
        let newer = NoteRecord { pitch: 64, ..NOTE };
        assert_eq!(notes.set(1, newer), Some(NOTE));
        assert_eq!(notes.get(1), Some(newer));
        assert_eq!(notes.active_count(), 1);
    }

    #[test]
    fn take_is_idempotent() {
        let mut notes = NoteTable::new(1);
        notes.set(0, NOTE);
        assert_eq!(notes.take(0), Some(NOTE));
        assert_eq!(notes.take(0), None);
    }

    #[test]
    fn drain_clears_everything() {
        let mut notes = NoteTable::new(3);
        notes.set(0, NOTE);
        notes.set(2, NOTE);
        assert_eq!(notes.drain(), vec![(0, NOTE), (2, NOTE)]);
        assert_eq!(notes.active_count(), 0);
    }
}
