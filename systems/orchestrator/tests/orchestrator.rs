use tidebot_core::{
    Ability, Action, PermanentEntities, Point, Snapshot, Unit, UnitId, VisibleEntities,
};
use tidebot_system_orchestrator::{
    BindingOrigin, BotOrchestrator, Config, FailureCause, SpawnError, SpawnPolicy, SpawnRequest,
    Strategy, StrategyError, TemplateError, TemplateRegistry, TickError,
};
use tidebot_world::UnitContext;

#[derive(Debug, Default)]
struct Counter {
    calls: i32,
}

impl Strategy for Counter {
    fn act(&mut self, _context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        self.calls += 1;
        Ok(Some(Action::Attack {
            x: self.calls,
            y: 0,
        }))
    }
}

#[derive(Debug)]
struct Faulty;

impl Strategy for Faulty {
    fn act(&mut self, _context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        Err(StrategyError::Failed("boom".to_owned()))
    }
}

#[derive(Debug)]
struct Panicky;

impl Strategy for Panicky {
    fn act(&mut self, _context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        panic!("kaboom");
    }
}

#[derive(Debug)]
struct RogueSpawner;

impl Strategy for RogueSpawner {
    fn act(&mut self, context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        Ok(Some(Action::Spawn {
            abilities: Vec::new(),
            location: context.location(),
            id: UnitId::new(77),
        }))
    }
}

#[derive(Debug)]
struct FixedSpawns {
    per_tick: usize,
}

impl SpawnPolicy for FixedSpawns {
    fn plan(
        &mut self,
        _snapshot: &Snapshot,
        templates: &TemplateRegistry,
        out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError> {
        for column in 0..self.per_tick {
            out.push(SpawnRequest::from_template(
                templates,
                "counter",
                &[Ability::Scout, Ability::Harvest],
                Point::new(column as i32, 0),
            )?);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct BrokenPolicy;

impl SpawnPolicy for BrokenPolicy {
    fn plan(
        &mut self,
        _snapshot: &Snapshot,
        templates: &TemplateRegistry,
        out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError> {
        out.push(SpawnRequest::from_template(
            templates,
            "counter",
            &[],
            Point::new(0, 0),
        )?);
        Err(SpawnError::Policy("out of ideas".to_owned()))
    }
}

#[derive(Debug)]
struct FailsOnTick {
    tick: u64,
}

impl SpawnPolicy for FailsOnTick {
    fn plan(
        &mut self,
        snapshot: &Snapshot,
        _templates: &TemplateRegistry,
        _out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError> {
        if snapshot.tick == self.tick {
            return Err(SpawnError::Policy(format!("refusing tick {}", self.tick)));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PanickingPolicy;

impl SpawnPolicy for PanickingPolicy {
    fn plan(
        &mut self,
        _snapshot: &Snapshot,
        _templates: &TemplateRegistry,
        _out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError> {
        panic!("policy exploded");
    }
}

fn registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry
        .register("counter", &[Ability::Harvest], Counter::default)
        .expect("counter");
    registry
        .register("faulty", &[], || Faulty)
        .expect("faulty");
    registry
        .register("panicky", &[], || Panicky)
        .expect("panicky");
    registry
        .register("rogue", &[], || RogueSpawner)
        .expect("rogue");
    registry.set_default("counter").expect("default");
    registry
}

fn unit(id: u64, template: Option<&str>) -> Unit {
    Unit {
        id: UnitId::new(id),
        owner_id: 0,
        location: Point::new(id as i32 % 20, 5),
        energy: 10.0,
        scraps: 0,
        abilities: Vec::new(),
        algae_held: 0,
        template: template.map(str::to_owned),
    }
}

fn snapshot(tick: u64, units: Vec<Unit>) -> Snapshot {
    Snapshot {
        tick,
        scraps: 100,
        algae: 0,
        bot_count: units.len() as u32,
        max_bots: 50,
        width: 20,
        height: 20,
        units,
        visible_entities: VisibleEntities::default(),
        permanent_entities: PermanentEntities::default(),
    }
}

fn attack_count(action: Option<&Action>) -> Option<i32> {
    match action {
        Some(Action::Attack { x, .. }) => Some(*x),
        _ => None,
    }
}

#[test]
fn binding_persists_while_unit_is_alive() {
    let mut orchestrator = BotOrchestrator::new(Config::default(), registry());

    let first = orchestrator.run_tick(&snapshot(1, vec![unit(4, None)]));
    let serial = orchestrator
        .bindings()
        .get(UnitId::new(4))
        .expect("bound")
        .serial();
    let second = orchestrator.run_tick(&snapshot(2, vec![unit(4, None)]));

    assert_eq!(attack_count(first.get(UnitId::new(4))), Some(1));
    assert_eq!(attack_count(second.get(UnitId::new(4))), Some(2));
    let binding = orchestrator.bindings().get(UnitId::new(4)).expect("bound");
    assert_eq!(binding.serial(), serial);
    assert_eq!(binding.origin(), BindingOrigin::Adopted { tick: 1 });
    assert_eq!(
        orchestrator.last_report().expect("report").created,
        Vec::<UnitId>::new()
    );
}

#[test]
fn vanished_unit_is_reaped_and_rebound_fresh() {
    let mut orchestrator = BotOrchestrator::new(Config::default(), registry());

    let _ = orchestrator.run_tick(&snapshot(1, vec![unit(1, None), unit(2, None)]));
    let _ = orchestrator.run_tick(&snapshot(2, vec![unit(1, None), unit(2, None)]));
    let old_serial = orchestrator
        .bindings()
        .get(UnitId::new(2))
        .expect("bound")
        .serial();

    let _ = orchestrator.run_tick(&snapshot(3, vec![unit(1, None)]));
    let report = orchestrator.last_report().expect("report");
    assert_eq!(report.reaped, vec![UnitId::new(2)]);
    assert!(report.orphaned.is_empty());
    assert!(!orchestrator.bindings().contains(UnitId::new(2)));

    let batch = orchestrator.run_tick(&snapshot(4, vec![unit(1, None), unit(2, None)]));
    let rebound = orchestrator.bindings().get(UnitId::new(2)).expect("rebound");
    assert_ne!(rebound.serial(), old_serial);
    assert_eq!(attack_count(batch.get(UnitId::new(2))), Some(1));
    assert_eq!(attack_count(batch.get(UnitId::new(1))), Some(4));
}

#[test]
fn failing_units_are_isolated_from_the_rest_of_the_tick() {
    let mut orchestrator = BotOrchestrator::new(Config::default(), registry());
    let units = vec![
        unit(3, Some("panicky")),
        unit(1, Some("counter")),
        unit(2, Some("faulty")),
        unit(4, Some("rogue")),
    ];

    let batch = orchestrator.run_tick(&snapshot(1, units));

    assert_eq!(batch.len(), 1);
    assert_eq!(attack_count(batch.get(UnitId::new(1))), Some(1));

    let report = orchestrator.last_report().expect("report");
    let failed: Vec<(UnitId, &FailureCause)> = report
        .failures
        .iter()
        .map(|failure| (failure.unit, &failure.cause))
        .collect();
    assert_eq!(failed.len(), 3);
    assert_eq!(failed[0].0, UnitId::new(2));
    assert_eq!(
        failed[0].1,
        &FailureCause::Strategy(StrategyError::Failed("boom".to_owned()))
    );
    assert_eq!(failed[1].0, UnitId::new(3));
    assert_eq!(failed[1].1, &FailureCause::Panicked("kaboom".to_owned()));
    assert_eq!(failed[2], (UnitId::new(4), &FailureCause::SpawnRefused));

    assert_eq!(orchestrator.bindings().len(), 4);
}

#[test]
fn unknown_templates_are_skipped_or_unmanaged() {
    let mut strict = TemplateRegistry::new();
    strict
        .register("counter", &[], Counter::default)
        .expect("counter");
    strict.set_strict(true);
    let mut orchestrator = BotOrchestrator::new(Config::default(), strict);

    let batch = orchestrator.run_tick(&snapshot(
        1,
        vec![unit(1, Some("counter")), unit(2, Some("ghost"))],
    ));
    assert_eq!(batch.len(), 1);
    let report = orchestrator.last_report().expect("report");
    assert_eq!(
        report.failures[0].cause,
        FailureCause::Template(TemplateError::UnknownTemplate {
            unit: UnitId::new(2),
            declared: Some("ghost".to_owned()),
        })
    );

    let mut lenient = TemplateRegistry::new();
    lenient
        .register("counter", &[], Counter::default)
        .expect("counter");
    let mut orchestrator = BotOrchestrator::new(Config::default(), lenient);
    let batch = orchestrator.run_tick(&snapshot(1, vec![unit(2, Some("ghost"))]));
    assert!(batch.is_empty());
    let report = orchestrator.last_report().expect("report");
    assert_eq!(report.unmanaged, vec![UnitId::new(2)]);
    assert!(report.failures.is_empty());
}

#[test]
fn spawn_phase_allocates_ids_and_prebinds() {
    let mut orchestrator = BotOrchestrator::new(Config::new(1000), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 2 });

    let batch = orchestrator.run_tick(&snapshot(1, vec![unit(1, None)]));

    let spawns: Vec<_> = batch.spawns().collect();
    assert_eq!(spawns.len(), 2);
    assert_eq!(spawns[0].0, UnitId::new(1000));
    assert_eq!(
        spawns[0].1,
        &Action::Spawn {
            abilities: vec![Ability::Harvest, Ability::Scout],
            location: Point::new(0, 0),
            id: UnitId::new(1000),
        }
    );
    assert_eq!(spawns[1].0, UnitId::new(1001));

    let binding = orchestrator
        .bindings()
        .get(UnitId::new(1000))
        .expect("prebound");
    assert_eq!(binding.origin(), BindingOrigin::Spawned { tick: 1 });
    assert!(!binding.seen_alive());
    assert_eq!(
        orchestrator.last_report().expect("report").spawned,
        vec![UnitId::new(1000), UnitId::new(1001)]
    );
}

#[test]
fn confirmed_spawn_keeps_its_binding_and_orphans_are_reported() {
    let mut orchestrator = BotOrchestrator::new(Config::new(1000), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 2 });

    let _ = orchestrator.run_tick(&snapshot(1, Vec::new()));
    let serial = orchestrator
        .bindings()
        .get(UnitId::new(1000))
        .expect("prebound")
        .serial();

    let _ = orchestrator.run_tick(&snapshot(2, vec![unit(1000, None)]));
    let report = orchestrator.last_report().expect("report");
    assert_eq!(report.orphaned, vec![UnitId::new(1001)]);
    assert_eq!(report.reaped, vec![UnitId::new(1001)]);
    assert!(report.created.is_empty());

    let confirmed = orchestrator
        .bindings()
        .get(UnitId::new(1000))
        .expect("confirmed");
    assert_eq!(confirmed.serial(), serial);
    assert!(confirmed.seen_alive());
}

#[test]
fn spawn_ids_skip_live_units() {
    let mut orchestrator = BotOrchestrator::new(Config::new(1), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 1 });

    let batch = orchestrator.run_tick(&snapshot(1, vec![unit(1, None), unit(2, None)]));

    let spawned: Vec<UnitId> = batch.spawns().map(|(unit, _)| unit).collect();
    assert_eq!(spawned, vec![UnitId::new(3)]);
}

#[test]
fn malformed_snapshot_degrades_to_an_empty_batch() {
    let mut orchestrator = BotOrchestrator::new(Config::default(), registry());
    let _ = orchestrator.run_tick(&snapshot(1, vec![unit(1, None)]));

    let batch = orchestrator.run_tick(&snapshot(2, vec![unit(5, None), unit(5, None)]));

    assert!(batch.is_empty());
    assert!(orchestrator.bindings().contains(UnitId::new(1)));
    assert!(!orchestrator.bindings().contains(UnitId::new(5)));
    let report = orchestrator.last_report().expect("report");
    assert!(matches!(report.degraded, Some(TickError::Snapshot(_))));
}

#[test]
fn failing_spawn_policy_rolls_back_the_tick() {
    let mut orchestrator =
        BotOrchestrator::new(Config::new(500), registry()).with_spawn_policy(BrokenPolicy);

    let batch = orchestrator.run_tick(&snapshot(1, vec![unit(1, None)]));

    assert!(batch.is_empty());
    assert!(orchestrator.bindings().is_empty());
    assert_eq!(
        orchestrator.last_report().expect("report").degraded,
        Some(TickError::Spawn(SpawnError::Policy("out of ideas".to_owned())))
    );
}

#[test]
fn panicking_spawn_policy_degrades_the_tick() {
    let mut orchestrator =
        BotOrchestrator::new(Config::default(), registry()).with_spawn_policy(PanickingPolicy);

    let batch = orchestrator.run_tick(&snapshot(1, vec![unit(1, None)]));

    assert!(batch.is_empty());
    assert_eq!(
        orchestrator.last_report().expect("report").degraded,
        Some(TickError::SpawnPanicked("policy exploded".to_owned()))
    );
}

#[test]
fn exhausted_id_space_rolls_back_spawns() {
    let mut orchestrator = BotOrchestrator::new(Config::new(u64::MAX), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 2 });

    let batch = orchestrator.run_tick(&snapshot(1, Vec::new()));

    assert!(batch.is_empty());
    assert!(orchestrator.bindings().is_empty());
    assert_eq!(
        orchestrator.last_report().expect("report").degraded,
        Some(TickError::IdsExhausted)
    );
}

#[test]
fn degraded_spawn_tick_still_reaps_vanished_units() {
    let mut orchestrator = BotOrchestrator::new(Config::default(), registry())
        .with_spawn_policy(FailsOnTick { tick: 2 });

    let _ = orchestrator.run_tick(&snapshot(1, vec![unit(1, None), unit(2, None)]));
    let old_serial = orchestrator
        .bindings()
        .get(UnitId::new(2))
        .expect("bound")
        .serial();

    let batch = orchestrator.run_tick(&snapshot(2, vec![unit(1, None)]));
    assert!(batch.is_empty());
    let report = orchestrator.last_report().expect("report");
    assert_eq!(
        report.degraded,
        Some(TickError::Spawn(SpawnError::Policy("refusing tick 2".to_owned())))
    );
    assert_eq!(report.reaped, vec![UnitId::new(2)]);
    assert!(orchestrator.bindings().contains(UnitId::new(1)));
    assert!(!orchestrator.bindings().contains(UnitId::new(2)));

    let batch = orchestrator.run_tick(&snapshot(3, vec![unit(1, None), unit(2, None)]));
    let rebound = orchestrator.bindings().get(UnitId::new(2)).expect("rebound");
    assert_ne!(rebound.serial(), old_serial);
    assert_eq!(attack_count(batch.get(UnitId::new(2))), Some(1));
    assert_eq!(attack_count(batch.get(UnitId::new(1))), Some(2));
    assert_eq!(
        orchestrator.last_report().expect("report").created,
        vec![UnitId::new(2)]
    );
}

#[test]
fn ids_allocated_before_a_rollback_stay_consumed() {
    let first = u64::MAX - 1;
    let mut orchestrator = BotOrchestrator::new(Config::new(first), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 3 });
    assert_eq!(orchestrator.next_spawn_id(), Some(first));

    let batch = orchestrator.run_tick(&snapshot(1, Vec::new()));
    assert!(batch.is_empty());
    assert!(orchestrator.bindings().is_empty());
    let report = orchestrator.last_report().expect("report");
    assert_eq!(report.degraded, Some(TickError::IdsExhausted));
    assert!(report.spawned.is_empty());
    assert_eq!(orchestrator.next_spawn_id(), None);

    let batch = orchestrator.run_tick(&snapshot(2, Vec::new()));
    assert_eq!(batch.spawns().count(), 0);
    assert_eq!(
        orchestrator.last_report().expect("report").degraded,
        Some(TickError::IdsExhausted)
    );
}

#[test]
fn spawn_ids_keep_increasing_across_a_degraded_tick() {
    let mut orchestrator = BotOrchestrator::new(Config::new(40), registry())
        .with_spawn_policy(FixedSpawns { per_tick: 2 });

    let first = orchestrator.run_tick(&snapshot(1, Vec::new()));
    let first_ids: Vec<UnitId> = first.spawns().map(|(unit, _)| unit).collect();
    assert_eq!(first_ids, vec![UnitId::new(40), UnitId::new(41)]);

    let degraded = orchestrator.run_tick(&snapshot(2, vec![unit(5, None), unit(5, None)]));
    assert!(degraded.is_empty());
    assert_eq!(orchestrator.next_spawn_id(), Some(42));

    let next = orchestrator.run_tick(&snapshot(3, Vec::new()));
    let next_ids: Vec<UnitId> = next.spawns().map(|(unit, _)| unit).collect();
    assert_eq!(next_ids, vec![UnitId::new(42), UnitId::new(43)]);
    assert!(next_ids.iter().all(|id| first_ids.iter().all(|old| id > old)));
}
