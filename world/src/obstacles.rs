//! Ephemeral obstacle sets derived from a snapshot.

use std::collections::BTreeSet;

use tidebot_core::{Point, Snapshot, UnitId};

use crate::query;

/// Cells that cannot be entered, gathered around a probe point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: BTreeSet<Point>,
}

impl ObstacleSet {
    pub(crate) fn collect(snapshot: &Snapshot, mover: UnitId, center: Point, radius: u32) -> Self {
        let mut cells: BTreeSet<Point> = query::walls_within(snapshot, center, radius)
            .into_iter()
            .collect();

        for enemy in query::enemies_within(snapshot, center, radius) {
            let _ = cells.insert(enemy.location);
        }

        for unit in &snapshot.units {
            if unit.id != mover && center.manhattan_distance(unit.location) <= radius {
                let _ = cells.insert(unit.location);
            }
        }

        Self { cells }
    }

    /// Reports whether `point` is an obstacle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.cells.contains(&point)
    }

    /// Iterator over obstacle cells in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().copied()
    }

    /// Number of obstacle cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no obstacle was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
