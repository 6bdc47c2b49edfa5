//! Incremental bookkeeping of predicted collisions between snakes.
//!
//! Somebody else works out how many ticks remain before two snakes meet; the
//! index only remembers that number, counts it down once per tick and reports
//! which snakes have run out of time. Every prediction is stored twice, once
//! on the attacker ("attacking") and once on the victim ("attacked by"), and
//! both copies always carry the same value.

use std::collections::{HashMap, HashSet};

use crate::SnakeId;

/// Remaining ticks until impact, keyed by the other snake of each pair.
pub type FutureCollisions = HashMap<SnakeId, i32>;

#[derive(Debug, Default, Clone)]
struct CollisionInfo {
    attacking: FutureCollisions,
    attacked_by: FutureCollisions,
}

impl CollisionInfo {
    fn is_empty(&self) -> bool {
        self.attacking.is_empty() && self.attacked_by.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct CollisionIndex {
    collisions: HashMap<SnakeId, CollisionInfo>,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers that `attacker` will hit `victim` in `ticks` ticks, replacing
    /// whatever was recorded for that ordered pair before.
    pub fn record(&mut self, attacker: SnakeId, victim: SnakeId, ticks: i32) {
        self.link(attacker, victim, ticks);
    }

    /// Drops every prediction `snake` takes part in, on both sides of each pair.
    /// Called whenever the snake leaves its straight-line trajectory.
    pub fn invalidate(&mut self, snake: SnakeId) {
        let Some(info) = self.collisions.get(&snake) else {
            return;
        };
        let victims: Vec<SnakeId> = info.attacking.keys().copied().collect();
        let attackers: Vec<SnakeId> = info.attacked_by.keys().copied().collect();

        for victim in victims {
            self.unlink(snake, victim);
        }
        for attacker in attackers {
            self.unlink(attacker, snake);
        }
    }

    /// Forgets `snake` entirely once it died or disconnected.
    pub fn remove(&mut self, snake: SnakeId) {
        self.invalidate(snake);
        self.collisions.remove(&snake);
    }

    /// One tick passed: every counter moves one step closer to impact.
    pub fn advance(&mut self) {
        for info in self.collisions.values_mut() {
            for ticks in info.attacking.values_mut() {
                *ticks -= 1;
            }
            for ticks in info.attacked_by.values_mut() {
                *ticks -= 1;
            }
        }
    }

    /// Snakes with at least one incoming prediction that reached zero.
    pub fn died(&self) -> HashSet<SnakeId> {
        self.collisions
            .iter()
            .filter(|(_, info)| info.attacked_by.values().any(|&ticks| ticks == 0))
            .map(|(&snake, _)| snake)
            .collect()
    }

    pub fn prediction(&self, attacker: SnakeId, victim: SnakeId) -> Option<i32> {
        self.collisions
            .get(&attacker)
            .and_then(|info| info.attacking.get(&victim))
            .copied()
    }

    /// Predictions where `snake` is the attacker; empty for unknown snakes.
    pub fn attacking(&self, snake: SnakeId) -> FutureCollisions {
        self.collisions
            .get(&snake)
            .map(|info| info.attacking.clone())
            .unwrap_or_default()
    }

    /// Predictions where `snake` is the victim; empty for unknown snakes.
    pub fn attacked_by(&self, snake: SnakeId) -> FutureCollisions {
        self.collisions
            .get(&snake)
            .map(|info| info.attacked_by.clone())
            .unwrap_or_default()
    }

    /// Number of recorded (attacker, victim) pairs.
    pub fn len(&self) -> usize {
        self.collisions.values().map(|info| info.attacking.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // `link` and `unlink` are the only places that touch the mirrored maps.

    fn link(&mut self, attacker: SnakeId, victim: SnakeId, ticks: i32) {
        self.collisions
            .entry(attacker)
            .or_default()
            .attacking
            .insert(victim, ticks);
        self.collisions
            .entry(victim)
            .or_default()
            .attacked_by
            .insert(attacker, ticks);
    }

    fn unlink(&mut self, attacker: SnakeId, victim: SnakeId) {
        if let Some(info) = self.collisions.get_mut(&attacker) {
            info.attacking.remove(&victim);
        }
        if let Some(info) = self.collisions.get_mut(&victim) {
            info.attacked_by.remove(&attacker);
        }
        self.prune(attacker);
        self.prune(victim);
    }

    fn prune(&mut self, snake: SnakeId) {
        if self.collisions.get(&snake).is_some_and(CollisionInfo::is_empty) {
            self.collisions.remove(&snake);
        }
    }
}
