#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn policy requesting new units from a single template.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tidebot_core::{Ability, Point, Snapshot};
use tidebot_system_orchestrator::{SpawnError, SpawnPolicy, SpawnRequest, TemplateRegistry};

/// Configuration parameters required to construct the spawning policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    template: String,
    extra_abilities: Vec<Ability>,
    min_scraps: u32,
    max_per_tick: u32,
    cooldown_ticks: u64,
    spawn_row: i32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration spawning `template` at most once per tick.
    #[must_use]
    pub fn new(template: impl Into<String>, rng_seed: u64) -> Self {
        Self {
            template: template.into(),
            extra_abilities: Vec::new(),
            min_scraps: 0,
            max_per_tick: 1,
            cooldown_ticks: 0,
            spawn_row: 0,
            rng_seed,
        }
    }

    /// Abilities appended to the template defaults.
    #[must_use]
    pub fn with_extra_abilities(mut self, abilities: Vec<Ability>) -> Self {
        self.extra_abilities = abilities;
        self
    }

    /// Team scraps required before a spawn is requested.
    #[must_use]
    pub const fn with_min_scraps(mut self, min_scraps: u32) -> Self {
        self.min_scraps = min_scraps;
        self
    }

    /// Upper bound on spawns requested in a single tick.
    #[must_use]
    pub const fn with_max_per_tick(mut self, max_per_tick: u32) -> Self {
        self.max_per_tick = max_per_tick;
        self
    }

    /// Ticks that must elapse between two requesting ticks.
    #[must_use]
    pub const fn with_cooldown_ticks(mut self, cooldown_ticks: u64) -> Self {
        self.cooldown_ticks = cooldown_ticks;
        self
    }

    /// Row new units are requested on, clamped to the grid.
    #[must_use]
    pub const fn with_spawn_row(mut self, spawn_row: i32) -> Self {
        self.spawn_row = spawn_row;
        self
    }

    /// Template spawned units are created from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Spawn policy that keeps the team topped up while resources allow.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
    last_request_tick: Option<u64>,
}

impl Spawning {
    /// Creates a new spawning policy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            rng,
            last_request_tick: None,
        }
    }

    fn cooling_down(&self, tick: u64) -> bool {
        self.last_request_tick
            .map_or(false, |last| tick.saturating_sub(last) < self.config.cooldown_ticks)
    }

    fn spawn_location(&mut self, snapshot: &Snapshot) -> Point {
        let last_row = i32::try_from(snapshot.height.saturating_sub(1)).unwrap_or(i32::MAX);
        let row = self.config.spawn_row.clamp(0, last_row);
        let column = self.rng.gen_range(0..snapshot.width);
        Point::new(i32::try_from(column).unwrap_or(i32::MAX), row)
    }
}

impl SpawnPolicy for Spawning {
    fn plan(
        &mut self,
        snapshot: &Snapshot,
        templates: &TemplateRegistry,
        out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError> {
        if !templates.contains(&self.config.template) {
            return Err(SpawnError::UnknownTemplate(self.config.template.clone()));
        }

        if snapshot.bot_count >= snapshot.max_bots
            || snapshot.scraps < self.config.min_scraps
            || snapshot.width == 0
            || self.cooling_down(snapshot.tick)
        {
            return Ok(());
        }

        let headroom = snapshot.max_bots - snapshot.bot_count;
        let count = self.config.max_per_tick.min(headroom);
        if count == 0 {
            return Ok(());
        }

        for _ in 0..count {
            let location = self.spawn_location(snapshot);
            out.push(SpawnRequest::from_template(
                templates,
                &self.config.template,
                &self.config.extra_abilities,
                location,
            )?);
        }

        self.last_request_tick = Some(snapshot.tick);
        debug!(
            "tick {}: requesting {count} `{}` spawn(s)",
            snapshot.tick, self.config.template
        );
        Ok(())
    }
}
