//! Movement helpers shared by the built-in strategies.

use tidebot_core::{Action, CapabilityMissing, Direction, Point};
use tidebot_system_movement::MovementPlanner;
use tidebot_world::UnitContext;

/// Largest radius any built-in strategy searches.
pub(crate) const MAX_SEARCH_RADIUS: u32 = 10;

/// Single step toward `target`, `None` when every neighbour is unusable.
pub(crate) fn step_toward(context: &UnitContext<'_>, target: Point) -> Option<Action> {
    MovementPlanner::new(context.bounds())
        .choose_direction(context.location(), target, |cell| context.is_blocked(cell))
        .map(|direction| context.move_in(direction))
}

/// Speed move toward `target`, `None` when no candidate clears a single cell.
pub(crate) fn dash_toward(
    context: &UnitContext<'_>,
    target: Point,
) -> Result<Option<Action>, CapabilityMissing> {
    let planned = MovementPlanner::new(context.bounds()).choose_speed_move(
        context.location(),
        target,
        context.abilities(),
        |cell| context.is_blocked(cell),
    )?;

    match planned.direction {
        Some(direction) => context.dash(direction, planned.steps).map(Some),
        None => Ok(None),
    }
}

/// Single step in `direction` when the cell is on the grid and free.
pub(crate) fn step_if_safe(context: &UnitContext<'_>, direction: Direction) -> Option<Action> {
    let next = context.location().step(direction);
    (context.bounds().contains(next) && !context.is_blocked(next))
        .then(|| context.move_in(direction))
}

/// Direction of an orthogonally adjacent cell.
pub(crate) fn adjacent_direction(from: Point, to: Point) -> Option<Direction> {
    Direction::SCAN_ORDER
        .into_iter()
        .find(|direction| from.step(*direction) == to)
}

/// Runs `probe` on radii `first..=MAX_SEARCH_RADIUS` and returns the first hit.
pub(crate) fn widening_search<T, F>(first: u32, probe: F) -> Option<T>
where
    F: FnMut(u32) -> Option<T>,
{
    (first..=MAX_SEARCH_RADIUS).find_map(probe)
}

/// Location in `candidates` nearest to `origin`, ties resolved by order.
pub(crate) fn nearest<I>(origin: Point, candidates: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    candidates
        .into_iter()
        .min_by_key(|candidate| origin.manhattan_distance(*candidate))
}
