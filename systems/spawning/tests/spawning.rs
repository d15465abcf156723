use tidebot_core::{Ability, Action, PermanentEntities, Point, Snapshot, VisibleEntities};
use tidebot_system_orchestrator::{
    SpawnError, SpawnPolicy, SpawnRequest, Strategy, StrategyError, TemplateRegistry,
};
use tidebot_system_spawning::{Config, Spawning};
use tidebot_world::UnitContext;

#[derive(Debug)]
struct Idle;

impl Strategy for Idle {
    fn act(&mut self, _context: &UnitContext<'_>) -> Result<Option<Action>, StrategyError> {
        Ok(None)
    }
}

fn templates() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry
        .register("forager", &[Ability::Harvest, Ability::Scout], || Idle)
        .expect("forager");
    registry
}

fn snapshot(tick: u64, scraps: u32, bot_count: u32, max_bots: u32) -> Snapshot {
    Snapshot {
        tick,
        scraps,
        algae: 0,
        bot_count,
        max_bots,
        width: 12,
        height: 12,
        units: Vec::new(),
        visible_entities: VisibleEntities::default(),
        permanent_entities: PermanentEntities::default(),
    }
}

fn plan(spawning: &mut Spawning, snapshot: &Snapshot) -> Vec<SpawnRequest> {
    let mut out = Vec::new();
    spawning
        .plan(snapshot, &templates(), &mut out)
        .expect("plan succeeds");
    out
}

#[test]
fn abilities_merge_template_defaults_with_extras() {
    let config = Config::new("forager", 7)
        .with_extra_abilities(vec![Ability::Scout, Ability::Speed, Ability::Speed]);
    let mut spawning = Spawning::new(config);

    let requests = plan(&mut spawning, &snapshot(1, 10, 0, 5));

    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].abilities,
        vec![Ability::Harvest, Ability::Scout, Ability::Speed]
    );
    assert_eq!(requests[0].template, "forager");
    assert_eq!(requests[0].location.y(), 0);
}

#[test]
fn respects_unit_cap_and_scrap_threshold() {
    let mut spawning = Spawning::new(Config::new("forager", 7).with_min_scraps(5));

    assert!(plan(&mut spawning, &snapshot(1, 10, 5, 5)).is_empty());
    assert!(plan(&mut spawning, &snapshot(2, 4, 0, 5)).is_empty());
    assert_eq!(plan(&mut spawning, &snapshot(3, 5, 0, 5)).len(), 1);
}

#[test]
fn never_exceeds_remaining_headroom() {
    let mut spawning = Spawning::new(Config::new("forager", 7).with_max_per_tick(4));

    assert_eq!(plan(&mut spawning, &snapshot(1, 0, 8, 10)).len(), 2);
}

#[test]
fn cooldown_suppresses_back_to_back_requests() {
    let mut spawning = Spawning::new(Config::new("forager", 7).with_cooldown_ticks(2));

    assert_eq!(plan(&mut spawning, &snapshot(1, 0, 0, 10)).len(), 1);
    assert!(plan(&mut spawning, &snapshot(2, 0, 0, 10)).is_empty());
    assert_eq!(plan(&mut spawning, &snapshot(3, 0, 0, 10)).len(), 1);
}

#[test]
fn same_seed_yields_same_spawn_columns() {
    let columns = |seed: u64| -> Vec<Point> {
        let mut spawning = Spawning::new(Config::new("forager", seed).with_max_per_tick(3));
        (1..=4)
            .flat_map(|tick| plan(&mut spawning, &snapshot(tick, 0, 0, 20)))
            .map(|request| request.location)
            .collect()
    };

    let first = columns(0x5eed);
    assert_eq!(first, columns(0x5eed));
    assert_eq!(first.len(), 12);
    assert!(first.iter().all(|point| (0..12).contains(&point.x())));
}

#[test]
fn unregistered_template_is_a_policy_failure() {
    let mut spawning = Spawning::new(Config::new("ghost", 7));
    let mut out = Vec::new();

    let result = spawning.plan(&snapshot(1, 0, 0, 5), &templates(), &mut out);

    assert_eq!(result, Err(SpawnError::UnknownTemplate("ghost".to_owned())));
    assert!(out.is_empty());
}
