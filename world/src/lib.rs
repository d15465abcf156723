#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only, unit-scoped views over a tick snapshot.
//!
//! Decision objects never see the raw [`Snapshot`] directly. Each tick the
//! orchestrator wraps the snapshot together with the unit being decided in a
//! [`UnitContext`], which offers sensing helpers, obstacle queries and action
//! builders that enforce the unit's capabilities.

mod obstacles;

pub use obstacles::ObstacleSet;

use tidebot_core::{
    Ability, Action, Algae, Bank, CapabilityMissing, Direction, EnemyUnit, GridBounds, Point,
    Scrap, Snapshot, Stride, Unit, UnitId,
};

/// Query radius used when deciding whether a single cell is blocked.
pub const BLOCK_QUERY_RADIUS: u32 = 1;

/// Per-tick view over the snapshot scoped to a single controlled unit.
#[derive(Clone, Copy, Debug)]
pub struct UnitContext<'a> {
    snapshot: &'a Snapshot,
    unit: &'a Unit,
}

impl<'a> UnitContext<'a> {
    /// Creates a context for `unit`, which must belong to `snapshot`.
    #[must_use]
    pub const fn new(snapshot: &'a Snapshot, unit: &'a Unit) -> Self {
        Self { snapshot, unit }
    }

    /// Snapshot the context reads from.
    #[must_use]
    pub const fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Unit the context is scoped to.
    #[must_use]
    pub const fn unit(&self) -> &'a Unit {
        self.unit
    }

    /// Identifier of the scoped unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.unit.id
    }

    /// Current location of the scoped unit.
    #[must_use]
    pub const fn location(&self) -> Point {
        self.unit.location
    }

    /// Tick the snapshot describes.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.snapshot.tick
    }

    /// Bounds of the playing grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.snapshot.bounds()
    }

    /// Abilities held by the scoped unit.
    #[must_use]
    pub fn abilities(&self) -> &'a [Ability] {
        &self.unit.abilities
    }

    /// Enemy units within `radius` of the scoped unit.
    #[must_use]
    pub fn enemies_within(&self, radius: u32) -> Vec<&'a EnemyUnit> {
        query::enemies_within(self.snapshot, self.location(), radius)
    }

    /// Algae within `radius` of the scoped unit, permanent algae included.
    #[must_use]
    pub fn algae_within(&self, radius: u32) -> Vec<&'a Algae> {
        query::algae_within(self.snapshot, self.location(), radius)
    }

    /// Scrap piles within `radius` of the scoped unit.
    #[must_use]
    pub fn scraps_within(&self, radius: u32) -> Vec<&'a Scrap> {
        query::scraps_within(self.snapshot, self.location(), radius)
    }

    /// Nearest visible enemy, ties resolved by snapshot order.
    #[must_use]
    pub fn nearest_enemy(&self) -> Option<&'a EnemyUnit> {
        let origin = self.location();
        self.snapshot
            .visible_entities
            .enemies
            .iter()
            .min_by_key(|enemy| origin.manhattan_distance(enemy.location))
    }

    /// Nearest known bank, ties resolved by snapshot order.
    #[must_use]
    pub fn nearest_bank(&self) -> Option<&'a Bank> {
        let origin = self.location();
        self.snapshot
            .permanent_entities
            .banks
            .iter()
            .min_by_key(|bank| origin.manhattan_distance(bank.location))
    }

    /// Other controlled units, in snapshot order.
    pub fn friendly_units(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        let mover = self.unit.id;
        self.snapshot
            .units
            .iter()
            .filter(move |unit| unit.id != mover)
    }

    /// Cells that cannot be entered within `radius` of `center`.
    ///
    /// The set covers walls, enemy units and every controlled unit other than
    /// the scoped one. It is computed afresh on every call.
    #[must_use]
    pub fn obstacles_within(&self, center: Point, radius: u32) -> ObstacleSet {
        ObstacleSet::collect(self.snapshot, self.unit.id, center, radius)
    }

    /// Reports whether `point` is occupied by an obstacle.
    #[must_use]
    pub fn is_blocked(&self, point: Point) -> bool {
        self.obstacles_within(point, BLOCK_QUERY_RADIUS)
            .contains(point)
    }

    /// Single-cell move in `direction`.
    #[must_use]
    pub const fn move_in(&self, direction: Direction) -> Action {
        Action::step(direction)
    }

    /// Move covering `cells` cells in `direction`.
    ///
    /// A two-cell move requires [`Ability::Speed`]; any other count is
    /// treated as a single step.
    pub fn dash(&self, direction: Direction, cells: u8) -> Result<Action, CapabilityMissing> {
        let step = if cells >= 2 {
            CapabilityMissing::check(self.abilities(), Ability::Speed)?;
            Stride::Double
        } else {
            Stride::Single
        };
        Ok(Action::Move { direction, step })
    }

    /// Harvest the adjacent cell in `direction`.
    pub fn harvest(&self, direction: Direction) -> Result<Action, CapabilityMissing> {
        CapabilityMissing::check(self.abilities(), Ability::Harvest)?;
        Ok(Action::Harvest { direction })
    }

    /// Attack the cell at `target`.
    #[must_use]
    pub const fn attack(&self, target: Point) -> Action {
        Action::Attack {
            x: target.x(),
            y: target.y(),
        }
    }

    /// Raise the unit's shield.
    pub fn defend(&self) -> Result<Action, CapabilityMissing> {
        CapabilityMissing::check(self.abilities(), Ability::Shield)?;
        Ok(Action::Defend)
    }

    /// Destroy the unit.
    pub fn self_destruct(&self) -> Result<Action, CapabilityMissing> {
        CapabilityMissing::check(self.abilities(), Ability::SelfDestruct)?;
        Ok(Action::SelfDestruct)
    }
}

/// Snapshot queries shared by contexts and adapters.
pub mod query {
    use tidebot_core::{Algae, EnemyUnit, Point, Scrap, Snapshot};

    /// Wall cells within `radius` of `center`.
    #[must_use]
    pub fn walls_within(snapshot: &Snapshot, center: Point, radius: u32) -> Vec<Point> {
        snapshot
            .visible_entities
            .walls
            .iter()
            .copied()
            .filter(|wall| center.manhattan_distance(*wall) <= radius)
            .collect()
    }

    /// Enemy units within `radius` of `center`.
    #[must_use]
    pub fn enemies_within(snapshot: &Snapshot, center: Point, radius: u32) -> Vec<&EnemyUnit> {
        snapshot
            .visible_entities
            .enemies
            .iter()
            .filter(|enemy| center.manhattan_distance(enemy.location) <= radius)
            .collect()
    }

    /// Algae within `radius` of `center`, visible entries before permanent ones.
    #[must_use]
    pub fn algae_within(snapshot: &Snapshot, center: Point, radius: u32) -> Vec<&Algae> {
        snapshot
            .visible_entities
            .algae
            .iter()
            .chain(snapshot.permanent_entities.algae.iter())
            .filter(|algae| center.manhattan_distance(algae.location) <= radius)
            .collect()
    }

    /// Scrap piles within `radius` of `center`.
    #[must_use]
    pub fn scraps_within(snapshot: &Snapshot, center: Point, radius: u32) -> Vec<&Scrap> {
        snapshot
            .visible_entities
            .scraps
            .iter()
            .filter(|scrap| center.manhattan_distance(scrap.location) <= radius)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidebot_core::{PermanentEntities, VisibleEntities};

    fn unit(id: u64, x: i32, y: i32, abilities: Vec<Ability>) -> Unit {
        Unit {
            id: UnitId::new(id),
            owner_id: 0,
            location: Point::new(x, y),
            energy: 50.0,
            scraps: 0,
            abilities,
            algae_held: 0,
            template: None,
        }
    }

    fn snapshot(units: Vec<Unit>, visible: VisibleEntities) -> Snapshot {
        Snapshot {
            tick: 3,
            scraps: 0,
            algae: 0,
            bot_count: units.len() as u32,
            max_bots: 10,
            width: 20,
            height: 20,
            units,
            visible_entities: visible,
            permanent_entities: PermanentEntities::default(),
        }
    }

    #[test]
    fn blocked_cells_cover_walls_enemies_and_friends_but_not_self() {
        let visible = VisibleEntities {
            enemies: vec![EnemyUnit {
                id: UnitId::new(90),
                location: Point::new(5, 6),
                scraps: 0,
                abilities: Vec::new(),
            }],
            walls: vec![Point::new(4, 5)],
            ..VisibleEntities::default()
        };
        let world = snapshot(
            vec![unit(1, 5, 5, Vec::new()), unit(2, 6, 5, Vec::new())],
            visible,
        );
        let context = UnitContext::new(&world, &world.units[0]);

        assert!(context.is_blocked(Point::new(4, 5)));
        assert!(context.is_blocked(Point::new(5, 6)));
        assert!(context.is_blocked(Point::new(6, 5)));
        assert!(!context.is_blocked(Point::new(5, 5)));
        assert!(!context.is_blocked(Point::new(5, 4)));
    }

    #[test]
    fn capability_checked_builders_surface_missing_abilities() {
        let world = snapshot(
            vec![unit(1, 0, 0, vec![Ability::Harvest])],
            VisibleEntities::default(),
        );
        let context = UnitContext::new(&world, &world.units[0]);

        assert_eq!(
            context.harvest(Direction::North),
            Ok(Action::Harvest {
                direction: Direction::North
            })
        );
        assert_eq!(
            context.self_destruct(),
            Err(CapabilityMissing {
                ability: Ability::SelfDestruct
            })
        );
        assert_eq!(
            context.defend(),
            Err(CapabilityMissing {
                ability: Ability::Shield
            })
        );
        assert_eq!(
            context.dash(Direction::East, 2),
            Err(CapabilityMissing {
                ability: Ability::Speed
            })
        );
    }

    #[test]
    fn sensing_respects_radius() {
        let visible = VisibleEntities {
            algae: vec![
                Algae {
                    location: Point::new(3, 0),
                    is_poison: None,
                },
                Algae {
                    location: Point::new(1, 1),
                    is_poison: Some(false),
                },
            ],
            ..VisibleEntities::default()
        };
        let world = snapshot(vec![unit(1, 0, 0, Vec::new())], visible);
        let context = UnitContext::new(&world, &world.units[0]);

        assert_eq!(context.algae_within(1).len(), 0);
        assert_eq!(context.algae_within(2).len(), 1);
        assert_eq!(context.algae_within(3).len(), 2);
    }
}
