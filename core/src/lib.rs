#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tidebot client.
//!
//! This crate defines the values that flow through a single tick. The engine
//! hands the client a [`Snapshot`] describing everything the team can see, the
//! orchestrator resolves a decision object for every controlled unit, and the
//! resulting [`Action`] values are collected into an [`ActionBatch`] that is
//! sent back to the engine. All types here are plain data; no type in this
//! crate performs I/O or keeps state across ticks.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Cardinal movement directions understood by the engine.
///
/// The engine's grid grows upward: [`Direction::North`] increases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// Fixed priority order used whenever directions are scanned.
    pub const SCAN_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit delta applied to a [`Point`] when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
        };
        f.write_str(name)
    }
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two points.
    #[must_use]
    pub fn manhattan_distance(self, other: Point) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// Returns the neighbouring point one cell away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.offset(direction, 1)
    }

    /// Returns the point `distance` cells away in `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the bounded playing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    width: u32,
    height: u32,
}

impl GridBounds {
    /// Creates bounds spanning `[0, width) x [0, height)`.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the point lies on the grid.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let inside_x = u32::try_from(point.x()).map_or(false, |x| x < self.width);
        let inside_y = u32::try_from(point.y()).map_or(false, |y| y < self.height);
        inside_x && inside_y
    }
}

/// Identifier of a controlled unit.
///
/// Identifiers either come from the engine through the [`Snapshot`] or are
/// allocated locally when the client requests a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capabilities a unit can be equipped with at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Ability {
    /// Allows harvesting algae and scraps from an adjacent cell.
    Harvest,
    /// Extends the unit's sensing range.
    Scout,
    /// Allows the unit to destroy itself and its surroundings.
    SelfDestruct,
    /// Allows moving two cells in a single tick.
    Speed,
    /// Allows the unit to defend.
    Shield,
    /// Allows opening locked structures.
    Lockpick,
    /// Any ability name this client does not recognise.
    Unknown,
}

impl Ability {
    /// Wire name of the ability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvest => "HARVEST",
            Self::Scout => "SCOUT",
            Self::SelfDestruct => "SELF_DESTRUCT",
            Self::Speed => "SPEED",
            Self::Shield => "SHIELD",
            Self::Lockpick => "LOCKPICK",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a wire name, mapping unrecognised names to [`Ability::Unknown`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "HARVEST" => Self::Harvest,
            "SCOUT" => Self::Scout,
            "SELF_DESTRUCT" => Self::SelfDestruct,
            "SPEED" => Self::Speed,
            "SHIELD" => Self::Shield,
            "LOCKPICK" => Self::Lockpick,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Ability {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an action requires an ability the unit does not hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unit lacks the {ability} ability")]
pub struct CapabilityMissing {
    /// Ability that was required.
    pub ability: Ability,
}

impl CapabilityMissing {
    /// Returns `Ok(())` when `abilities` contains `required`.
    pub fn check(abilities: &[Ability], required: Ability) -> Result<(), Self> {
        if abilities.contains(&required) {
            Ok(())
        } else {
            Err(Self { ability: required })
        }
    }
}

fn default_owner() -> i64 {
    -1
}

fn default_scrap_amount() -> u32 {
    1
}

/// Immutable representation of a controlled unit for one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier assigned to the unit.
    pub id: UnitId,
    /// Owning player, `-1` when the engine omits it.
    #[serde(default = "default_owner")]
    pub owner_id: i64,
    /// Cell currently occupied by the unit.
    pub location: Point,
    /// Remaining energy.
    pub energy: f64,
    /// Scraps carried by the unit.
    #[serde(default)]
    pub scraps: u32,
    /// Abilities the unit was spawned with.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Algae carried by the unit.
    #[serde(default)]
    pub algae_held: u32,
    /// Template the unit declares, when the engine echoes one back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Unit {
    /// Reports whether the unit holds `ability`.
    #[must_use]
    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }
}

/// Enemy unit visible to the team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyUnit {
    /// Identifier assigned to the enemy unit.
    pub id: UnitId,
    /// Cell occupied by the enemy.
    pub location: Point,
    /// Scraps carried by the enemy.
    #[serde(default)]
    pub scraps: u32,
    /// Abilities the enemy is known to hold.
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

/// Harvestable algae.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Algae {
    /// Cell holding the algae.
    pub location: Point,
    /// Whether the algae is known to be poisonous, `None` when unscouted.
    #[serde(default)]
    pub is_poison: Option<bool>,
}

/// Scrap lying on the ground.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrap {
    /// Cell holding the scrap.
    pub location: Point,
    /// Amount of scrap in the pile.
    #[serde(default = "default_scrap_amount")]
    pub amount: u32,
}

/// Bank where carried resources can be deposited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Cell occupied by the bank.
    pub location: Point,
    /// Identifier assigned to the bank.
    #[serde(default)]
    pub id: u64,
    /// Whether a deposit is in progress.
    #[serde(default, rename = "deposit_occuring")]
    pub deposit_occurring: i64,
    /// Amount currently being deposited.
    #[serde(default)]
    pub deposit_amount: i64,
    /// Player making the current deposit.
    #[serde(default)]
    pub deposit_owner: i64,
    /// Ticks until the current deposit completes.
    #[serde(default, rename = "depositticksleft")]
    pub deposit_ticks_left: i64,
}

/// Pad that recharges unit energy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyPad {
    /// Cell occupied by the pad.
    pub location: Point,
    /// Identifier assigned to the pad.
    #[serde(default)]
    pub id: u64,
    /// Whether the pad is currently available.
    #[serde(default)]
    pub available: i64,
    /// Ticks until the pad becomes available again.
    #[serde(default, rename = "ticksleft")]
    pub ticks_left: i64,
}

/// Entities currently visible to the team's units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibleEntities {
    /// Enemy units in sight.
    pub enemies: Vec<EnemyUnit>,
    /// Algae in sight.
    pub algae: Vec<Algae>,
    /// Scrap piles in sight.
    pub scraps: Vec<Scrap>,
    /// Wall cells in sight.
    pub walls: Vec<Point>,
}

/// Fixed structures that never move.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermanentEntities {
    /// Deposit banks.
    pub banks: Vec<Bank>,
    /// Energy pads.
    #[serde(rename = "energypads")]
    pub energy_pads: Vec<EnergyPad>,
    /// Permanently known algae.
    pub algae: Vec<Algae>,
}

/// Decoded, tick-scoped world view handed over by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation tick the snapshot describes.
    pub tick: u64,
    /// Scraps held by the team.
    pub scraps: u32,
    /// Algae banked by the team.
    pub algae: u32,
    /// Number of units the team controls according to the engine.
    pub bot_count: u32,
    /// Maximum number of units the team may control.
    pub max_bots: u32,
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Units controlled by the team.
    #[serde(default, rename = "bots")]
    pub units: Vec<Unit>,
    /// Entities in sight this tick.
    #[serde(default)]
    pub visible_entities: VisibleEntities,
    /// Fixed structures.
    #[serde(default)]
    pub permanent_entities: PermanentEntities,
}

impl Snapshot {
    /// Bounds of the playing grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        GridBounds::new(self.width, self.height)
    }

    /// Looks up a controlled unit by identifier.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Checks the structural invariants the orchestrator relies on.
    ///
    /// A snapshot must describe a non-empty grid, list every controlled unit
    /// at most once and place every controlled unit on the grid.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        let bounds = self.bounds();
        let mut seen = BTreeSet::new();
        for unit in &self.units {
            if !seen.insert(unit.id) {
                return Err(SnapshotError::DuplicateUnit(unit.id));
            }
            if !bounds.contains(unit.location) {
                return Err(SnapshotError::UnitOutOfBounds {
                    unit: unit.id,
                    location: unit.location,
                });
            }
        }

        Ok(())
    }
}

/// Structural defects that make a snapshot unusable for a tick.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The grid has no cells.
    #[error("grid {width}x{height} has no cells")]
    EmptyGrid {
        /// Reported grid width.
        width: u32,
        /// Reported grid height.
        height: u32,
    },
    /// The same unit appears twice in the controlled-unit list.
    #[error("unit {0} is listed more than once")]
    DuplicateUnit(UnitId),
    /// A controlled unit sits outside the grid.
    #[error("unit {unit} at {location} lies outside the grid")]
    UnitOutOfBounds {
        /// Offending unit.
        unit: UnitId,
        /// Reported location.
        location: Point,
    },
}

/// Number of cells a move covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stride {
    /// One cell.
    Single,
    /// Two cells, available to units with [`Ability::Speed`].
    Double,
}

impl Stride {
    /// Number of cells covered by the stride.
    #[must_use]
    pub const fn cells(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

impl Serialize for Stride {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.cells())
    }
}

/// Action a unit performs during a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Moves the unit.
    Move {
        /// Direction of travel.
        direction: Direction,
        /// Number of cells to cover.
        step: Stride,
    },
    /// Harvests the resource in the adjacent cell.
    Harvest {
        /// Direction of the harvested cell.
        direction: Direction,
    },
    /// Attacks a cell.
    Attack {
        /// Column of the attacked cell.
        x: i32,
        /// Row of the attacked cell.
        y: i32,
    },
    /// Raises the unit's shield for the tick.
    Defend,
    /// Destroys the unit.
    SelfDestruct,
    /// Requests creation of a new unit.
    Spawn {
        /// Abilities the new unit is equipped with.
        abilities: Vec<Ability>,
        /// Cell the new unit should appear on.
        location: Point,
        /// Identifier allocated locally for the new unit.
        id: UnitId,
    },
}

impl Action {
    /// Single-cell move in `direction`.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self::Move {
            direction,
            step: Stride::Single,
        }
    }

    /// Reports whether the action requests a spawn.
    #[must_use]
    pub const fn is_spawn(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}

/// Per-tick output mapping each unit to at most one action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionBatch {
    entries: BTreeMap<UnitId, Action>,
}

impl ActionBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `action` for `unit`, refusing a second action for the same unit.
    pub fn insert(&mut self, unit: UnitId, action: Action) -> Result<(), BatchError> {
        if self.entries.contains_key(&unit) {
            return Err(BatchError::Occupied(unit));
        }
        let _ = self.entries.insert(unit, action);
        Ok(())
    }

    /// Returns the action recorded for `unit`, if any.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&Action> {
        self.entries.get(&unit)
    }

    /// Iterator over all entries in ascending unit order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Action)> {
        self.entries.iter().map(|(unit, action)| (*unit, action))
    }

    /// Iterator over spawn requests in ascending unit order.
    pub fn spawns(&self) -> impl Iterator<Item = (UnitId, &Action)> {
        self.iter().filter(|(_, action)| action.is_spawn())
    }

    /// Iterator over unit actions other than spawns in ascending unit order.
    pub fn unit_actions(&self) -> impl Iterator<Item = (UnitId, &Action)> {
        self.iter().filter(|(_, action)| !action.is_spawn())
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the batch carries no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reasons an action could not be added to a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BatchError {
    /// The unit already has an action this tick.
    #[error("unit {0} already has an action this tick")]
    Occupied(UnitId),
}
