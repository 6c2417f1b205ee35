//! Cell buffer between the world and the terminal
//!
//! Drawing goes into a grid sized to the live terminal; anything outside it is
//! dropped. Flushing only emits cells that changed since the previous frame.

use std::io::Write;

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Color, Print},
    terminal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Reset,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Set one cell; out-of-bounds positions are skipped
    pub fn put(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { ch, fg };
        }
    }

    /// Write a string left to right, one cell per char
    pub fn text(&mut self, x: i32, y: i32, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i as i32, y, ch, fg);
        }
    }

    /// Write a string horizontally centered on row `y`
    pub fn centered(&mut self, y: i32, text: &str, fg: Color) {
        let len = text.chars().count() as i32;
        self.text((self.width as i32 - len) / 2, y, text, fg);
    }

    /// Multi-line sprite with its top-left corner at (x, y)
    pub fn sprite(&mut self, x: i32, y: i32, rows: &[&str], fg: Color) {
        for (dy, row) in rows.iter().enumerate() {
            self.text(x, y + dy as i32, row, fg);
        }
    }

    pub fn row_string(&self, y: u16) -> String {
        let start = y as usize * self.width as usize;
        self.cells[start..start + self.width as usize]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    /// Queue the cells that differ from `previous` (all of them when the
    /// sizes differ) and flush. Per-cell queue errors are ignored.
    pub fn flush_to<W: Write>(&self, out: &mut W, previous: Option<&Canvas>) -> std::io::Result<()> {
        let previous = previous.filter(|p| p.width == self.width && p.height == self.height);
        if previous.is_none() {
            let _ = out.queue(terminal::Clear(terminal::ClearType::All));
        }

        let mut color = None;
        let mut cursor_at = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y as usize * self.width as usize + x as usize;
                let cell = self.cells[i];
                if previous.is_some_and(|p| p.cells[i] == cell) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    let _ = out.queue(cursor::MoveTo(x, y));
                }
                if color != Some(cell.fg) {
                    let _ = out.queue(style::SetForegroundColor(cell.fg));
                    color = Some(cell.fg);
                }
                let _ = out.queue(Print(cell.ch));
                cursor_at = Some((x + 1, y));
            }
        }

        let _ = out.queue(style::ResetColor);
        out.flush()
    }
}
