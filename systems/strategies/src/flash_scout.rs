use tidebot_core::{Ability, Action, Direction};
use tidebot_system_orchestrator::{Strategy, StrategyError};
use tidebot_world::UnitContext;

use crate::navigate::{dash_toward, nearest, step_if_safe, widening_search};

/// Fast scout racing toward the nearest algae it can sense.
#[derive(Clone, Debug, Default)]
pub struct FlashScout;

impl FlashScout {
    /// Abilities a flash scout is spawned with.
    pub const ABILITIES: &'static [Ability] = &[Ability::Speed, Ability::Scout];
}

impl Strategy for FlashScout {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        let origin = context.location();
        let target = widening_search(1, |radius| {
            let algae = context.algae_within(radius).into_iter().map(|a| a.location);
            nearest(origin, algae.filter(|cell| *cell != origin))
        });

        match target {
            Some(target) => Ok(dash_toward(context, target)?),
            None => Ok(step_if_safe(context, Direction::North)),
        }
    }
}
