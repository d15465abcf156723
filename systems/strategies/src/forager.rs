use tidebot_core::{Ability, Action, Point};
use tidebot_system_orchestrator::{Strategy, StrategyError};
use tidebot_world::UnitContext;

use crate::navigate::{adjacent_direction, nearest, step_toward, widening_search};

/// Algae carried before the forager heads for a bank.
pub const FULL_LOAD: u32 = 5;

/// Collects algae and scrap, then carries the load to the nearest bank.
#[derive(Clone, Debug, Default)]
pub struct Forager;

impl Forager {
    /// Abilities a forager is spawned with.
    pub const ABILITIES: &'static [Ability] = &[Ability::Harvest, Ability::Scout];

    fn find_resource(context: &UnitContext<'_>) -> Option<Point> {
        let origin = context.location();
        widening_search(1, |radius| {
            let algae = context.algae_within(radius).into_iter().map(|a| a.location);
            let scraps = context.scraps_within(radius).into_iter().map(|s| s.location);
            nearest(origin, algae.chain(scraps).filter(|cell| *cell != origin))
        })
    }
}

impl Strategy for Forager {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        let origin = context.location();

        if context.unit().algae_held >= FULL_LOAD {
            if let Some(bank) = context.nearest_bank() {
                if bank.location == origin {
                    return Ok(None);
                }
                return Ok(step_toward(context, bank.location));
            }
        }

        let Some(resource) = Self::find_resource(context) else {
            return Ok(None);
        };

        match adjacent_direction(origin, resource) {
            Some(direction) => Ok(Some(context.harvest(direction)?)),
            None => Ok(step_toward(context, resource)),
        }
    }
}
