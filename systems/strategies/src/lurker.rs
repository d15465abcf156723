use tidebot_core::{Ability, Action, Direction};
use tidebot_system_orchestrator::{Strategy, StrategyError};
use tidebot_world::UnitContext;

use crate::navigate::step_if_safe;

/// Attacks whatever enemy is in sight, otherwise patrols south.
#[derive(Clone, Debug, Default)]
pub struct Lurker;

impl Lurker {
    /// Abilities a lurker is spawned with.
    pub const ABILITIES: &'static [Ability] = &[Ability::Shield];
}

impl Strategy for Lurker {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        if let Some(enemy) = context.nearest_enemy() {
            return Ok(Some(context.attack(enemy.location)));
        }
        Ok(step_if_safe(context, Direction::South))
    }
}
