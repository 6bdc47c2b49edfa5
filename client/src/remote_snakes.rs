use std::collections::HashMap;
use std::io;

use common::MoveUpdate;
use crossterm::style::Color;

use crate::renderer::Renderer;

pub const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

/// Other players' snakes, known only through the deltas relayed for them.
#[derive(Debug, Default)]
pub struct RemoteSnakes {
    colors: HashMap<i32, Color>,
}

impl RemoteSnakes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colors are handed out round-robin in order of first appearance.
    pub fn color_for(&mut self, sender_id: i32) -> Color {
        let next = PALETTE[self.colors.len() % PALETTE.len()];
        *self.colors.entry(sender_id).or_insert(next)
    }

    pub fn apply<R: Renderer>(&mut self, update: &MoveUpdate, renderer: &mut R) -> io::Result<()> {
        let color = self.color_for(update.sender_id);
        if let Some(head) = update.new_head {
            renderer.draw_cell(head.into(), color)?;
        }
        if let Some(tail) = update.old_tail {
            renderer.clear_cell(tail.into())?;
        }
        renderer.flush()
    }
}
