use serde::{Deserialize, Serialize};

use crate::Loc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<Point> for Loc {
    fn from(point: Point) -> Self {
        Loc { x: point.x, y: point.y }
    }
}

impl From<Loc> for Point {
    fn from(loc: Loc) -> Self {
        Point::new(loc.x, loc.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step on the grid; y grows downwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryMode {
    #[default]
    Bounded,
    Wrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
    OtherSnakeCollision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSize {
    pub width: i32,
    pub height: i32,
}

impl FieldSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        (0..self.width).contains(&point.x) && (0..self.height).contains(&point.y)
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Neighbour of `from` in `direction`. `None` when the step leaves a
    /// bounded field; a wrapping field re-enters at the opposite edge.
    pub fn step(&self, from: Point, direction: Direction, boundary: BoundaryMode) -> Option<Point> {
        let next = from.offset(direction);
        match boundary {
            BoundaryMode::Bounded => self.contains(next).then_some(next),
            BoundaryMode::Wrap => Some(Point::new(
                next.x.rem_euclid(self.width),
                next.y.rem_euclid(self.height),
            )),
        }
    }
}
