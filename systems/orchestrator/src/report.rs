use thiserror::Error;
use tidebot_core::{BatchError, SnapshotError, UnitId};

use crate::{SpawnError, StrategyError, TemplateError};

/// Summary of the lifecycle changes and failures of one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick the report describes.
    pub tick: u64,
    /// Units adopted from the snapshot this tick.
    pub created: Vec<UnitId>,
    /// Identifiers allocated for spawn requests this tick.
    pub spawned: Vec<UnitId>,
    /// Units whose bindings were removed this tick.
    pub reaped: Vec<UnitId>,
    /// Reaped spawn bindings whose unit never appeared.
    pub orphaned: Vec<UnitId>,
    /// Units that produced no action because of a failure.
    pub failures: Vec<UnitFailure>,
    /// Units left without a decision object by a lenient registry.
    pub unmanaged: Vec<UnitId>,
    /// Tick-level failure that replaced the output with an empty batch.
    pub degraded: Option<TickError>,
}

impl TickReport {
    pub(crate) fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub(crate) fn degraded(tick: u64, error: TickError) -> Self {
        Self {
            tick,
            degraded: Some(error),
            ..Self::default()
        }
    }

    /// Reports whether the tick completed without any recorded failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded.is_none()
    }
}

/// Failure isolated to a single unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitFailure {
    /// Unit that produced no action.
    pub unit: UnitId,
    /// Cause of the failure.
    pub cause: FailureCause,
}

/// Why a unit produced no action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureCause {
    /// The decision object returned an error.
    Strategy(StrategyError),
    /// The decision object panicked.
    Panicked(String),
    /// No template could be resolved for the unit.
    Template(TemplateError),
    /// The decision object returned a spawn, which only the spawn phase may emit.
    SpawnRefused,
    /// The batch already held an action for the unit.
    Collision(BatchError),
}

/// Failures that degrade a whole tick to an empty batch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TickError {
    /// The snapshot violates a structural invariant.
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    /// The spawn policy failed.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// The spawn policy panicked.
    #[error("spawn policy panicked: {0}")]
    SpawnPanicked(String),
    /// No unit identifier is left to allocate.
    #[error("unit id space exhausted")]
    IdsExhausted,
    /// A spawn order could not be added to the batch.
    #[error(transparent)]
    Batch(#[from] BatchError),
}
