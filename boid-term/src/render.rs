use std::io::{self, Write};

use boid_core::Flock;
use boid_shared::{Cell, Position};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

pub const BOID_GLYPH: char = 'o';
const EMPTY: char = ' ';

/// One screenful of boid markers
pub struct Frame {
    rows: u16,
    cols: u16,
    cells: Vec<char>,
    marked: Vec<Cell>,
}

impl Frame {
    pub fn blank(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![EMPTY; rows as usize * cols as usize],
            marked: Vec::new(),
        }
    }

    pub fn from_flock(flock: &Flock, rows: u16, cols: u16) -> Self {
        let mut frame = Self::blank(rows, cols);
        for boid in flock.boids() {
            frame.plot(boid.position.into());
        }
        frame
    }

    /// Marks the cell under `position`; returns false if it is off the surface.
    pub fn plot(&mut self, position: Position) -> bool {
        let Some(cell) = Cell::from_position(position, self.rows, self.cols) else {
            return false;
        };
        let index = cell.row as usize * self.cols as usize + cell.col as usize;
        if self.cells[index] != BOID_GLYPH {
            self.cells[index] = BOID_GLYPH;
            self.marked.push(cell);
        }
        true
    }

    pub fn get(&self, row: u16, col: u16) -> Option<char> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row as usize * self.cols as usize + col as usize])
        } else {
            None
        }
    }

    /// Number of distinct occupied cells
    pub fn occupied(&self) -> usize {
        self.marked.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.cols.max(1) as usize)
            .take(self.rows as usize)
            .map(|row| row.iter().collect())
    }

    /// Erases the screen and prints a marker at every occupied cell.
    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, Clear(ClearType::All))?;
        for cell in &self.marked {
            queue!(out, MoveTo(cell.col, cell.row), Print(BOID_GLYPH))?;
        }
        out.flush()
    }
}
