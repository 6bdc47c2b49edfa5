mod body;
mod game_state;
mod projection;
mod types;

pub use body::{MoveOutcome, Snake};
pub use game_state::{SnakeGameState, TickReport};
pub use projection::ticks_until_impact;
pub use types::{BoundaryMode, DeathReason, Direction, FieldSize, Point};
