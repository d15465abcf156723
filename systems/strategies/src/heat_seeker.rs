use tidebot_core::{Ability, Action, Point};
use tidebot_system_orchestrator::{Strategy, StrategyError};
use tidebot_world::UnitContext;

use crate::navigate::{adjacent_direction, step_toward};

/// Walks to a remembered target and detonates on arrival.
///
/// An occupied target cannot be entered, so standing next to it counts as
/// arrival.
#[derive(Clone, Debug, Default)]
pub struct HeatSeeker {
    target: Option<Point>,
}

impl HeatSeeker {
    /// Abilities a heat seeker is spawned with.
    pub const ABILITIES: &'static [Ability] = &[Ability::Speed, Ability::SelfDestruct];

    /// Creates a heat seeker locked onto `target`.
    #[must_use]
    pub const fn with_target(target: Point) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Target currently remembered.
    #[must_use]
    pub const fn target(&self) -> Option<Point> {
        self.target
    }
}

impl Strategy for HeatSeeker {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        if self.target.is_none() {
            self.target = context.nearest_enemy().map(|enemy| enemy.location);
        }
        let Some(target) = self.target else {
            return Ok(None);
        };

        let location = context.location();
        let beside_occupied =
            adjacent_direction(location, target).is_some() && context.is_blocked(target);
        if location == target || beside_occupied {
            return Ok(Some(context.self_destruct()?));
        }
        Ok(step_toward(context, target))
    }
}
