use tidebot_core::{Ability, Action, Direction, Point};
use tidebot_system_orchestrator::{Strategy, StrategyError};
use tidebot_world::UnitContext;

use crate::navigate::{nearest, step_if_safe, step_toward, widening_search};

/// Hunts enemies and self-destructs once one is adjacent.
#[derive(Clone, Debug, Default)]
pub struct Saboteur {
    target: Option<Point>,
}

impl Saboteur {
    /// Abilities a saboteur is spawned with.
    pub const ABILITIES: &'static [Ability] = &[Ability::SelfDestruct];

    /// Target currently remembered.
    #[must_use]
    pub const fn target(&self) -> Option<Point> {
        self.target
    }
}

impl Strategy for Saboteur {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        if !context.enemies_within(1).is_empty() {
            return Ok(Some(context.self_destruct()?));
        }

        let origin = context.location();
        if self.target.is_none() {
            self.target = widening_search(2, |radius| {
                nearest(
                    origin,
                    context
                        .enemies_within(radius)
                        .into_iter()
                        .map(|enemy| enemy.location),
                )
            });
        }

        if let Some(target) = self.target {
            if origin == target {
                self.target = None;
            } else if let Some(step) = step_toward(context, target) {
                return Ok(Some(step));
            } else {
                self.target = None;
            }
        }

        Ok(step_if_safe(context, Direction::North))
    }
}
