use std::collections::HashMap;

use super::body::Snake;
use super::types::{BoundaryMode, Direction, FieldSize, Point};

/// Ticks until `victim`'s head runs into `attacker`, assuming both keep their
/// current headings and neither grows. `Some(1)` means the very next move.
///
/// Moves within a tick count as simultaneous: on tick `k` the victim's head is
/// checked against the cells the attacker holds after its own `k`-th move,
/// i.e. what is left of its current body plus the trail its head has laid.
pub fn ticks_until_impact(
    attacker: &Snake,
    victim: &Snake,
    field: &FieldSize,
    boundary: BoundaryMode,
) -> Option<i32> {
    let length = attacker.len() as i32;
    // Segment index counted from the head; index `i` is released after `length - i` moves.
    let age: HashMap<Point, i32> = attacker.body().zip(0..).collect();
    let trail = Trail {
        origin: attacker.head(),
        heading: attacker.heading(),
        field,
        boundary,
    };

    let mut position = victim.head();
    for tick in 1..=horizon(field, boundary) {
        position = field.step(position, victim.heading(), boundary)?;

        if age.get(&position).is_some_and(|&index| tick + index < length) {
            return Some(tick);
        }
        if let Some(laid_at) = trail.latest_visit(position, tick)
            && laid_at > tick - length
        {
            return Some(tick);
        }
    }
    None
}

fn horizon(field: &FieldSize, boundary: BoundaryMode) -> i32 {
    match boundary {
        // Nobody survives more than one crossing of the field.
        BoundaryMode::Bounded => field.width.max(field.height),
        // Both straight-line paths repeat within this many steps.
        BoundaryMode::Wrap => field.width * field.height,
    }
}

/// Cells a head lays down moving straight from `origin`.
struct Trail<'a> {
    origin: Point,
    heading: Direction,
    field: &'a FieldSize,
    boundary: BoundaryMode,
}

impl Trail<'_> {
    /// Latest step `j` in `1..=tick` whose cell is `point`, if any.
    fn latest_visit(&self, point: Point, tick: i32) -> Option<i32> {
        let (dx, dy) = self.heading.offset();
        let (distance, period) = if dx != 0 {
            if point.y != self.origin.y {
                return None;
            }
            ((point.x - self.origin.x) * dx, self.field.width)
        } else {
            if point.x != self.origin.x {
                return None;
            }
            ((point.y - self.origin.y) * dy, self.field.height)
        };

        match self.boundary {
            BoundaryMode::Bounded => (1..=tick).contains(&distance).then_some(distance),
            BoundaryMode::Wrap => {
                let first = match distance.rem_euclid(period) {
                    0 => period,
                    step => step,
                };
                (first <= tick).then(|| first + (tick - first) / period * period)
            }
        }
    }
}
