//! TOML configuration for the client binary.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tidebot_core::Ability;
use tidebot_system_orchestrator::{self as orchestrator, BotOrchestrator, DEFAULT_FIRST_SPAWN_ID};
use tidebot_system_spawning::{self as spawning, Spawning};
use tidebot_system_strategies::{builtin_registry, FORAGER};

/// Configuration bundled into the binary and used when no file is given.
pub(crate) const BUNDLED_CONFIG: &str = include_str!("../config/default.toml");

/// Complete client configuration as read from TOML.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) orchestrator: OrchestratorSection,
    pub(crate) templates: TemplatesSection,
    pub(crate) spawning: SpawningSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OrchestratorSection {
    pub(crate) first_spawn_id: u64,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            first_spawn_id: DEFAULT_FIRST_SPAWN_ID,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TemplatesSection {
    pub(crate) default: Option<String>,
    pub(crate) strict: bool,
    pub(crate) roles: Vec<RoleSection>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoleSection {
    pub(crate) template: String,
    pub(crate) abilities: Vec<Ability>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawningSection {
    pub(crate) enabled: bool,
    pub(crate) template: String,
    pub(crate) extra_abilities: Vec<Ability>,
    pub(crate) min_scraps: u32,
    pub(crate) max_per_tick: u32,
    pub(crate) cooldown_ticks: u64,
    pub(crate) spawn_row: i32,
    pub(crate) seed: u64,
}

impl Default for SpawningSection {
    fn default() -> Self {
        Self {
            enabled: false,
            template: FORAGER.to_owned(),
            extra_abilities: Vec::new(),
            min_scraps: 0,
            max_per_tick: 1,
            cooldown_ticks: 0,
            spawn_row: 0,
            seed: 0,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }

    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Settings bundled with the binary.
    pub(crate) fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_CONFIG).context("bundled configuration is invalid")
    }

    /// Builds an orchestrator with the built-in templates and configured policy.
    pub(crate) fn build(&self) -> Result<BotOrchestrator> {
        let mut templates = builtin_registry().context("failed to register built-in templates")?;

        for role in &self.templates.roles {
            templates
                .add_role(&role.template, &role.abilities)
                .with_context(|| format!("invalid role rule for `{}`", role.template))?;
        }
        if let Some(default) = &self.templates.default {
            templates
                .set_default(default)
                .with_context(|| format!("invalid default template `{default}`"))?;
        }
        templates.set_strict(self.templates.strict);

        let spawn = &self.spawning;
        if spawn.enabled && !templates.contains(&spawn.template) {
            bail!("spawn template `{}` is not registered", spawn.template);
        }

        let config = orchestrator::Config::new(self.orchestrator.first_spawn_id);
        let client = BotOrchestrator::new(config, templates);
        if !spawn.enabled {
            return Ok(client);
        }

        let policy = Spawning::new(
            spawning::Config::new(spawn.template.clone(), spawn.seed)
                .with_extra_abilities(spawn.extra_abilities.clone())
                .with_min_scraps(spawn.min_scraps)
                .with_max_per_tick(spawn.max_per_tick)
                .with_cooldown_ticks(spawn.cooldown_ticks)
                .with_spawn_row(spawn.spawn_row),
        );
        Ok(client.with_spawn_policy(policy))
    }
}
