use std::collections::{BTreeMap, BTreeSet};

use crate::collision::CollisionIndex;
use crate::games::SessionRng;
use crate::{log, SnakeId};
use super::body::{MoveOutcome, Snake};
use super::projection::ticks_until_impact;
use super::types::{BoundaryMode, DeathReason, Direction, FieldSize, Point};

const FOOD_PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Default)]
pub struct TickReport {
    /// One entry per snake that was alive when the tick started.
    pub moves: Vec<(SnakeId, MoveOutcome)>,
    pub deaths: BTreeMap<SnakeId, DeathReason>,
    /// Final bodies of the snakes that died this tick.
    pub removed: Vec<(SnakeId, Snake)>,
    pub food_eaten: bool,
}

/// Several snakes sharing one field and one food cell.
///
/// Walls and self-collisions come straight out of each snake's move. Snakes
/// running into each other are never searched for geometrically: a prediction
/// is worked out once per pair when a trajectory changes and then counted down
/// by the collision index.
#[derive(Debug)]
pub struct SnakeGameState {
    field: FieldSize,
    boundary: BoundaryMode,
    snakes: BTreeMap<SnakeId, Snake>,
    food: Option<Point>,
    collisions: CollisionIndex,
    rng: SessionRng,
}

impl SnakeGameState {
    pub fn new(field: FieldSize, boundary: BoundaryMode, rng: SessionRng) -> Self {
        Self {
            field,
            boundary,
            snakes: BTreeMap::new(),
            food: None,
            collisions: CollisionIndex::new(),
            rng,
        }
    }

    pub fn field(&self) -> FieldSize {
        self.field
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes.get(&id)
    }

    pub fn snakes(&self) -> impl Iterator<Item = (SnakeId, &Snake)> {
        self.snakes.iter().map(|(&id, snake)| (id, snake))
    }

    pub fn collisions(&self) -> &CollisionIndex {
        &self.collisions
    }

    pub fn add_snake(&mut self, id: SnakeId, snake: Snake) {
        self.snakes.insert(id, snake);
        self.repredict(&[id]);
        if self.food.is_none() {
            self.spawn_food();
        }
    }

    pub fn remove_snake(&mut self, id: SnakeId) -> Option<Snake> {
        self.collisions.remove(id);
        self.snakes.remove(&id)
    }

    /// Returns whether the turn was accepted. Unknown snakes accept nothing.
    pub fn queue_direction(&mut self, id: SnakeId, direction: Direction) -> bool {
        self.snakes
            .get_mut(&id)
            .is_some_and(|snake| snake.queue_direction(direction))
    }

    /// Places food explicitly, e.g. to set up a scenario.
    pub fn set_food(&mut self, food: Option<Point>) {
        self.food = food;
    }

    pub fn tick(&mut self) -> TickReport {
        if self.food.is_none() {
            self.spawn_food();
        }

        let turned: Vec<SnakeId> = self
            .snakes
            .iter_mut()
            .filter_map(|(&id, snake)| snake.next_direction().then_some(id))
            .collect();
        self.repredict(&turned);

        let mut report = TickReport::default();
        for (&id, snake) in self.snakes.iter_mut() {
            let outcome = snake.advance(&self.field, self.boundary, self.food);
            if let Some(reason) = outcome.death {
                report.deaths.insert(id, reason);
            }
            report.moves.push((id, outcome));
        }

        self.collisions.advance();
        for id in self.collisions.died() {
            report.deaths.entry(id).or_insert(DeathReason::OtherSnakeCollision);
        }

        for (&id, reason) in &report.deaths {
            log!("Snake {} died: {:?}", id, reason);
            if let Some(snake) = self.remove_snake(id) {
                report.removed.push((id, snake));
            }
        }

        let grew: Vec<SnakeId> = report
            .moves
            .iter()
            .filter(|(id, outcome)| outcome.grew && self.snakes.contains_key(id))
            .map(|(id, _)| *id)
            .collect();
        if report.moves.iter().any(|(_, outcome)| outcome.grew) {
            report.food_eaten = true;
            self.food = None;
            self.spawn_food();
        }
        // A longer body keeps its tail around for longer than predicted.
        self.repredict(&grew);

        report
    }

    fn repredict(&mut self, changed: &[SnakeId]) {
        if changed.is_empty() {
            return;
        }
        for &id in changed {
            self.collisions.invalidate(id);
        }

        let changed: BTreeSet<SnakeId> = changed.iter().copied().collect();
        let ids: Vec<SnakeId> = self.snakes.keys().copied().collect();
        for &id in &changed {
            for &other in &ids {
                // Pairs of two changed snakes are handled once, from the smaller id.
                if other == id || (changed.contains(&other) && other < id) {
                    continue;
                }
                self.predict(id, other);
                self.predict(other, id);
            }
        }
    }

    fn predict(&mut self, attacker: SnakeId, victim: SnakeId) {
        let (Some(attacking), Some(attacked)) = (self.snakes.get(&attacker), self.snakes.get(&victim)) else {
            return;
        };
        if let Some(ticks) = ticks_until_impact(attacking, attacked, &self.field, self.boundary) {
            self.collisions.record(attacker, victim, ticks);
        }
    }

    fn is_free(&self, point: Point) -> bool {
        self.snakes.values().all(|snake| !snake.occupies(point))
    }

    fn spawn_food(&mut self) {
        if self.field.cell_count() == 0 {
            return;
        }
        for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
            let candidate = Point::new(
                self.rng.random_range(0..self.field.width),
                self.rng.random_range(0..self.field.height),
            );
            if self.is_free(candidate) {
                self.food = Some(candidate);
                return;
            }
        }

        // Crowded field: fall back to the first free cell, if there is one.
        let width = self.field.width;
        let free = (0..self.field.height)
            .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
            .find(|&point| self.is_free(point));
        self.food = free;
        if free.is_none() {
            log!("No free cell left for food");
        }
    }
}
