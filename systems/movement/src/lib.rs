#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic local movement planner shared by every decision strategy.
//!
//! The planner is pure: it never reads the snapshot itself. Callers pass an
//! obstacle predicate, usually `UnitContext::is_blocked` from the world crate,
//! and receive the direction to take this tick. Directions that would leave
//! the grid are discarded before the predicate is consulted.

use tidebot_core::{Ability, CapabilityMissing, Direction, GridBounds, Point};

/// Outcome of a speed move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpeedMove {
    /// Direction to travel, `None` when no candidate clears a single cell.
    pub direction: Option<Direction>,
    /// Number of cells to cover: 0, 1 or 2.
    pub steps: u8,
}

impl SpeedMove {
    /// Speed move that stays in place.
    pub const STAY: Self = Self {
        direction: None,
        steps: 0,
    };
}

/// Obstacle-aware direction selection within fixed grid bounds.
#[derive(Clone, Copy, Debug)]
pub struct MovementPlanner {
    bounds: GridBounds,
}

impl MovementPlanner {
    /// Creates a planner for a grid with the provided bounds.
    #[must_use]
    pub const fn new(bounds: GridBounds) -> Self {
        Self { bounds }
    }

    /// Bounds the planner keeps moves within.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Chooses a single-cell direction from `current` toward `target`.
    ///
    /// The preferred direction follows the dominant axis of the offset, with
    /// ties going to the horizontal axis. When the preferred cell is blocked
    /// the remaining in-bounds directions are tried in scan order. `None`
    /// means no safe move exists; arrival is not special cased.
    #[must_use]
    pub fn choose_direction<F>(&self, current: Point, target: Point, blocked: F) -> Option<Direction>
    where
        F: Fn(Point) -> bool,
    {
        self.candidates(current, target)
            .find(|direction| !blocked(current.step(*direction)))
    }

    /// Chooses a direction and stride for a unit holding [`Ability::Speed`].
    ///
    /// Candidates are tried in the same order as [`Self::choose_direction`].
    /// The first candidate whose first cell is free wins; the move covers two
    /// cells when the second cell is also in bounds and free.
    pub fn choose_speed_move<F>(
        &self,
        current: Point,
        target: Point,
        abilities: &[Ability],
        blocked: F,
    ) -> Result<SpeedMove, CapabilityMissing>
    where
        F: Fn(Point) -> bool,
    {
        CapabilityMissing::check(abilities, Ability::Speed)?;

        for direction in self.candidates(current, target) {
            if blocked(current.step(direction)) {
                continue;
            }

            let second = current.offset(direction, 2);
            let steps = if self.bounds.contains(second) && !blocked(second) {
                2
            } else {
                1
            };
            return Ok(SpeedMove {
                direction: Some(direction),
                steps,
            });
        }

        Ok(SpeedMove::STAY)
    }

    fn candidates(&self, current: Point, target: Point) -> Candidates {
        let mut candidates = Candidates::default();
        let preferred = preferred_direction(current, target);

        if self.bounds.contains(current.step(preferred)) {
            candidates.push(preferred);
        }
        for direction in Direction::SCAN_ORDER {
            if direction != preferred && self.bounds.contains(current.step(direction)) {
                candidates.push(direction);
            }
        }

        candidates
    }
}

fn preferred_direction(current: Point, target: Point) -> Direction {
    let dx = i64::from(target.x()) - i64::from(current.x());
    let dy = i64::from(target.y()) - i64::from(current.y());

    if dx.abs() >= dy.abs() {
        if dx > 0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if dy > 0 {
        Direction::North
    } else {
        Direction::South
    }
}

#[derive(Clone, Debug, Default)]
struct Candidates {
    buffer: [Option<Direction>; 4],
    len: usize,
    cursor: usize,
}

impl Candidates {
    fn push(&mut self, direction: Direction) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(direction);
            self.len += 1;
        }
    }
}

impl Iterator for Candidates {
    type Item = Direction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}
