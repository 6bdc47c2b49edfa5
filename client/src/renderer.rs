use std::io::{self, Write};

use common::games::snake::Point;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

const CELL: &str = "██";
const BLANK: &str = "  ";
const FOOD: &str = " ◎";

/// Where the game draws. Each call addresses one field cell; nothing is
/// guaranteed to be visible before `flush`.
pub trait Renderer {
    fn draw_cell(&mut self, point: Point, color: Color) -> io::Result<()>;
    fn clear_cell(&mut self, point: Point) -> io::Result<()>;
    fn draw_food(&mut self, point: Point) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Draws the field straight onto a terminal, two columns per cell.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn print_at(&mut self, point: Point, color: Option<Color>, text: &str) -> io::Result<()> {
        // Cells outside the terminal's coordinate space are silently skipped.
        let column = point.x.checked_mul(2).and_then(|column| u16::try_from(column).ok());
        let (Some(column), Ok(row)) = (column, u16::try_from(point.y)) else {
            return Ok(());
        };
        queue!(self.out, MoveTo(column, row))?;
        match color {
            Some(color) => queue!(self.out, SetForegroundColor(color), Print(text), ResetColor),
            None => queue!(self.out, Print(text)),
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn draw_cell(&mut self, point: Point, color: Color) -> io::Result<()> {
        self.print_at(point, Some(color), CELL)
    }

    fn clear_cell(&mut self, point: Point) -> io::Result<()> {
        self.print_at(point, None, BLANK)
    }

    fn draw_food(&mut self, point: Point) -> io::Result<()> {
        self.print_at(point, None, FOOD)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Draw {
        Cell(Point, Color),
        Clear(Point),
        Food(Point),
    }

    /// Remembers every call instead of drawing.
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub draws: Vec<Draw>,
        pub flushes: usize,
    }

    impl RecordingRenderer {
        pub fn cleared(&self) -> Vec<Point> {
            self.draws
                .iter()
                .filter_map(|draw| match draw {
                    Draw::Clear(point) => Some(*point),
                    _ => None,
                })
                .collect()
        }
    }

    impl Renderer for RecordingRenderer {
        fn draw_cell(&mut self, point: Point, color: Color) -> io::Result<()> {
            self.draws.push(Draw::Cell(point, color));
            Ok(())
        }

        fn clear_cell(&mut self, point: Point) -> io::Result<()> {
            self.draws.push(Draw::Clear(point));
            Ok(())
        }

        fn draw_food(&mut self, point: Point) -> io::Result<()> {
            self.draws.push(Draw::Food(point));
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }
}
