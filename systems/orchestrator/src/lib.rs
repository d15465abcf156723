#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bot lifecycle orchestration.
//!
//! The [`BotOrchestrator`] owns the binding table that ties every controlled
//! unit to one persistent decision object. Each tick it runs three phases in
//! a fixed order:
//!
//! 1. the spawn phase allocates identifiers for requested spawns and binds
//!    their decision objects before the engine has confirmed them;
//! 2. the unit loop visits controlled units in ascending id order, adopting
//!    unknown units through the [`TemplateRegistry`] and invoking each
//!    decision object in isolation;
//! 3. the reaping phase drops bindings whose unit no longer exists.
//!
//! Failures of a single unit never affect other units. Failures that make the
//! tick meaningless (a malformed snapshot or a failing spawn policy) degrade
//! the whole tick to an empty batch.

mod allocator;
mod bindings;
mod report;
mod spawn;
mod strategy;
mod templates;

pub use allocator::IdAllocator;
pub use bindings::{Binding, BindingOrigin, BindingTable};
pub use report::{FailureCause, TickError, TickReport, UnitFailure};
pub use spawn::{SpawnError, SpawnPolicy, SpawnRequest};
pub use strategy::{Strategy, StrategyError};
pub use templates::{RoleRule, TemplateError, TemplateRegistry};

use std::{
    any::Any,
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
};

use log::{debug, error, warn};
use tidebot_core::{Action, ActionBatch, Snapshot, Unit, UnitId};
use tidebot_world::UnitContext;

/// First identifier handed out for locally requested spawns by default.
pub const DEFAULT_FIRST_SPAWN_ID: u64 = 1;

/// Configuration parameters required to construct the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    first_spawn_id: u64,
}

impl Config {
    /// Creates a configuration whose spawn ids start at `first_spawn_id`.
    #[must_use]
    pub const fn new(first_spawn_id: u64) -> Self {
        Self { first_spawn_id }
    }

    /// First identifier considered for locally requested spawns.
    #[must_use]
    pub const fn first_spawn_id(&self) -> u64 {
        self.first_spawn_id
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_SPAWN_ID)
    }
}

/// Owns the binding table and turns snapshots into action batches.
#[derive(Debug)]
pub struct BotOrchestrator {
    templates: TemplateRegistry,
    bindings: BindingTable,
    allocator: IdAllocator,
    spawn_policy: Option<Box<dyn SpawnPolicy>>,
    last_report: Option<TickReport>,
}

impl BotOrchestrator {
    /// Creates an orchestrator with no spawn policy.
    #[must_use]
    pub fn new(config: Config, templates: TemplateRegistry) -> Self {
        Self {
            templates,
            bindings: BindingTable::default(),
            allocator: IdAllocator::new(config.first_spawn_id()),
            spawn_policy: None,
            last_report: None,
        }
    }

    /// Installs the policy consulted during the spawn phase.
    #[must_use]
    pub fn with_spawn_policy<P>(mut self, policy: P) -> Self
    where
        P: SpawnPolicy + 'static,
    {
        self.spawn_policy = Some(Box::new(policy));
        self
    }

    /// Template registry used to adopt unknown units.
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Current binding table.
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Next identifier the spawn allocator will consider.
    #[must_use]
    pub fn next_spawn_id(&self) -> Option<u64> {
        self.allocator.peek()
    }

    /// Report describing the most recent tick.
    #[must_use]
    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Processes one snapshot and returns the actions to send to the engine.
    ///
    /// A malformed snapshot leaves the binding table untouched. A failing
    /// spawn phase rolls back this tick's spawns and skips the unit loop, but
    /// bindings of units missing from the snapshot are still reaped.
    pub fn run_tick(&mut self, snapshot: &Snapshot) -> ActionBatch {
        if let Err(snapshot_error) = snapshot.validate() {
            let tick_error = TickError::from(snapshot_error);
            error!(
                "tick {} degraded to an empty batch: {tick_error}",
                snapshot.tick
            );
            self.last_report = Some(TickReport::degraded(snapshot.tick, tick_error));
            return ActionBatch::new();
        }

        let alive: BTreeSet<UnitId> = snapshot.units.iter().map(|unit| unit.id).collect();
        let mut report = TickReport::new(snapshot.tick);
        let batch = match self.drive_tick(snapshot, &alive, &mut report) {
            Ok(batch) => batch,
            Err(tick_error) => {
                let rolled_back: BTreeSet<UnitId> = report.spawned.iter().copied().collect();
                let _ = self
                    .bindings
                    .drain_unless(|unit| !rolled_back.contains(&unit));
                error!(
                    "tick {} degraded to an empty batch: {tick_error}",
                    snapshot.tick
                );
                report = TickReport::degraded(snapshot.tick, tick_error);
                ActionBatch::new()
            }
        };

        self.reap(&alive, &mut report);
        self.last_report = Some(report);
        batch
    }

    fn drive_tick(
        &mut self,
        snapshot: &Snapshot,
        alive: &BTreeSet<UnitId>,
        report: &mut TickReport,
    ) -> Result<ActionBatch, TickError> {
        let mut batch = ActionBatch::new();
        self.spawn_phase(snapshot, alive, &mut batch, report)?;

        let mut units: Vec<&Unit> = snapshot.units.iter().collect();
        units.sort_by_key(|unit| unit.id);
        for unit in units {
            self.drive_unit(snapshot, unit, &mut batch, report);
        }
        Ok(batch)
    }

    fn spawn_phase(
        &mut self,
        snapshot: &Snapshot,
        alive: &BTreeSet<UnitId>,
        batch: &mut ActionBatch,
        report: &mut TickReport,
    ) -> Result<(), TickError> {
        let Some(policy) = self.spawn_policy.as_mut() else {
            return Ok(());
        };

        let mut requests = Vec::new();
        let templates = &self.templates;
        let planned = panic::catch_unwind(AssertUnwindSafe(|| {
            policy.plan(snapshot, templates, &mut requests)
        }));
        match planned {
            Ok(result) => result?,
            Err(payload) => return Err(TickError::SpawnPanicked(panic_message(payload.as_ref()))),
        }

        let mut allocated = Vec::with_capacity(requests.len());
        for _ in &requests {
            let bindings = &self.bindings;
            let unit = self
                .allocator
                .allocate(|candidate| bindings.contains(candidate) || alive.contains(&candidate))
                .ok_or(TickError::IdsExhausted)?;
            allocated.push(unit);
        }

        for (unit, request) in allocated.into_iter().zip(requests) {
            let SpawnRequest {
                template,
                abilities,
                location,
                strategy,
            } = request;

            batch.insert(
                unit,
                Action::Spawn {
                    abilities,
                    location,
                    id: unit,
                },
            )?;
            let serial = self.bindings.bind(
                unit,
                &template,
                BindingOrigin::Spawned {
                    tick: snapshot.tick,
                },
                strategy,
            );
            report.spawned.push(unit);
            debug!(
                "tick {}: requested spawn {unit} at {location} as `{template}` (binding {serial})",
                snapshot.tick
            );
        }

        Ok(())
    }

    fn drive_unit(
        &mut self,
        snapshot: &Snapshot,
        unit: &Unit,
        batch: &mut ActionBatch,
        report: &mut TickReport,
    ) {
        if !self.bindings.contains(unit.id) && !self.adopt(snapshot.tick, unit, report) {
            return;
        }

        let Some(binding) = self.bindings.get_mut(unit.id) else {
            return;
        };
        binding.mark_alive();

        let context = UnitContext::new(snapshot, unit);
        let strategy = binding.strategy_mut();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.act(&context)));

        let cause = match outcome {
            Ok(Ok(None)) => return,
            Ok(Ok(Some(action))) if action.is_spawn() => FailureCause::SpawnRefused,
            Ok(Ok(Some(action))) => match batch.insert(unit.id, action) {
                Ok(()) => return,
                Err(collision) => FailureCause::Collision(collision),
            },
            Ok(Err(strategy_error)) => FailureCause::Strategy(strategy_error),
            Err(payload) => FailureCause::Panicked(panic_message(payload.as_ref())),
        };

        match &cause {
            FailureCause::Panicked(message) => {
                error!("tick {}: unit {} panicked: {message}", snapshot.tick, unit.id);
            }
            other => {
                warn!("tick {}: unit {} produced no action: {other:?}", snapshot.tick, unit.id);
            }
        }
        report.failures.push(UnitFailure {
            unit: unit.id,
            cause,
        });
    }

    /// Binds a decision object to a unit seen for the first time.
    ///
    /// Returns `false` when the unit stays without a binding this tick.
    fn adopt(&mut self, tick: u64, unit: &Unit, report: &mut TickReport) -> bool {
        let template = match self.templates.resolve(unit) {
            Ok(Some(template)) => template,
            Ok(None) => {
                debug!("tick {tick}: unit {} left unmanaged", unit.id);
                report.unmanaged.push(unit.id);
                return false;
            }
            Err(template_error) => {
                warn!("tick {tick}: skipping unit {}: {template_error}", unit.id);
                report.failures.push(UnitFailure {
                    unit: unit.id,
                    cause: FailureCause::Template(template_error),
                });
                return false;
            }
        };

        let strategy = match self.templates.instantiate(template) {
            Ok(strategy) => strategy,
            Err(template_error) => {
                warn!("tick {tick}: skipping unit {}: {template_error}", unit.id);
                report.failures.push(UnitFailure {
                    unit: unit.id,
                    cause: FailureCause::Template(template_error),
                });
                return false;
            }
        };

        let serial = self
            .bindings
            .bind(unit.id, template, BindingOrigin::Adopted { tick }, strategy);
        report.created.push(unit.id);
        debug!(
            "tick {tick}: adopted unit {} as `{template}` (binding {serial})",
            unit.id
        );
        true
    }

    fn reap(&mut self, alive: &BTreeSet<UnitId>, report: &mut TickReport) {
        let spawned: BTreeSet<UnitId> = report.spawned.iter().copied().collect();
        let reaped = self
            .bindings
            .drain_unless(|unit| alive.contains(&unit) || spawned.contains(&unit));

        for (unit, binding) in reaped {
            report.reaped.push(unit);
            match binding.origin() {
                BindingOrigin::Spawned { tick } if !binding.seen_alive() => {
                    warn!(
                        "tick {}: spawn {unit} requested on tick {tick} never appeared",
                        report.tick
                    );
                    report.orphaned.push(unit);
                }
                _ => {
                    debug!(
                        "tick {}: unit {unit} vanished, binding {} reaped",
                        report.tick,
                        binding.serial()
                    );
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
