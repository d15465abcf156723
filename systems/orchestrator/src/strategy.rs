use std::fmt;

use thiserror::Error;
use tidebot_core::{Action, CapabilityMissing};
use tidebot_world::UnitContext;

/// Stateful decision logic bound to a single unit for its whole lifetime.
///
/// The orchestrator keeps one instance per live unit and calls [`Strategy::act`]
/// once per tick. Any state stored in the implementor survives between ticks.
pub trait Strategy: fmt::Debug {
    /// Decides the unit's action for the tick, `None` meaning no action.
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError>;
}

/// Failure reported by a decision object for a single tick.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The decision required an ability the unit lacks.
    #[error(transparent)]
    Capability(#[from] CapabilityMissing),
    /// The decision could not be completed.
    #[error("decision failed: {0}")]
    Failed(String),
}
