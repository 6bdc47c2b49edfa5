use std::collections::{HashSet, VecDeque};

use super::types::{BoundaryMode, DeathReason, Direction, FieldSize, Point};

/// Result of moving a snake by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub new_head: Point,
    /// `None` when the snake grew and kept its tail.
    pub old_tail: Option<Point>,
    pub grew: bool,
    pub death: Option<DeathReason>,
}

impl MoveOutcome {
    fn died(new_head: Point, reason: DeathReason) -> Self {
        Self {
            new_head,
            old_tail: None,
            grew: false,
            death: Some(reason),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Point>,
    occupied: HashSet<Point>,
    heading: Direction,
    pending: VecDeque<Direction>,
}

impl Snake {
    /// Lays out `length` segments ending at `head`, trailing away from `heading`.
    pub fn new(head: Point, heading: Direction, length: usize) -> Self {
        let behind = heading.opposite();
        let mut body = VecDeque::with_capacity(length);
        let mut occupied = HashSet::with_capacity(length);
        let mut segment = head;
        for _ in 0..length.max(1) {
            body.push_back(segment);
            occupied.insert(segment);
            segment = segment.offset(behind);
        }

        Self {
            body,
            occupied,
            heading,
            pending: VecDeque::new(),
        }
    }

    pub fn head(&self) -> Point {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Point {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Segments from head to tail.
    pub fn body(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    pub fn occupies(&self, point: Point) -> bool {
        self.occupied.contains(&point)
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn pending_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter().copied()
    }

    /// Queues a turn unless it reverses the last queued direction (or the
    /// heading, with nothing queued). Returns whether the turn was queued.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        let last = self.pending.back().copied().unwrap_or(self.heading);
        if direction.is_opposite(last) {
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    /// Applies at most one queued turn. Returns whether the heading changed.
    pub fn next_direction(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(direction) if direction != self.heading => {
                self.heading = direction;
                true
            }
            _ => false,
        }
    }

    /// Moves one cell along the heading. A fatal move leaves the body untouched.
    pub fn advance(&mut self, field: &FieldSize, boundary: BoundaryMode, food: Option<Point>) -> MoveOutcome {
        let Some(new_head) = field.step(self.head(), self.heading, boundary) else {
            return MoveOutcome::died(self.head().offset(self.heading), DeathReason::WallCollision);
        };

        // The tail has not moved out yet, so stepping onto it is fatal too.
        if !self.occupied.insert(new_head) {
            return MoveOutcome::died(new_head, DeathReason::SelfCollision);
        }
        self.body.push_front(new_head);

        if food == Some(new_head) {
            return MoveOutcome {
                new_head,
                old_tail: None,
                grew: true,
                death: None,
            };
        }

        let tail = self.body.pop_back().expect("Snake body should never be empty");
        self.occupied.remove(&tail);
        MoveOutcome {
            new_head,
            old_tail: Some(tail),
            grew: false,
            death: None,
        }
    }
}
