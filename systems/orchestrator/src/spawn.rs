use std::fmt;

use thiserror::Error;
use tidebot_core::{Ability, Point, Snapshot};

use crate::{Strategy, TemplateRegistry};

/// Source of spawn requests evaluated once per tick before units act.
pub trait SpawnPolicy: fmt::Debug {
    /// Appends the spawns wanted this tick to `out`.
    fn plan(
        &mut self,
        snapshot: &Snapshot,
        templates: &TemplateRegistry,
        out: &mut Vec<SpawnRequest>,
    ) -> Result<(), SpawnError>;
}

/// Request to create a new unit driven by the supplied decision object.
#[derive(Debug)]
pub struct SpawnRequest {
    /// Template the decision object was created from.
    pub template: String,
    /// Abilities the unit should be equipped with.
    pub abilities: Vec<Ability>,
    /// Cell the unit should appear on.
    pub location: Point,
    /// Decision object bound to the unit once its id is allocated.
    pub strategy: Box<dyn Strategy>,
}

impl SpawnRequest {
    /// Builds a request from a registered template.
    ///
    /// The abilities are the template defaults followed by `extra`, with
    /// duplicates dropped while keeping first occurrences in order.
    pub fn from_template(
        templates: &TemplateRegistry,
        template: &str,
        extra: &[Ability],
        location: Point,
    ) -> Result<Self, SpawnError> {
        let defaults = templates
            .default_abilities(template)
            .ok_or_else(|| SpawnError::UnknownTemplate(template.to_owned()))?;
        let strategy = templates
            .instantiate(template)
            .map_err(|_| SpawnError::UnknownTemplate(template.to_owned()))?;

        let mut abilities: Vec<Ability> = Vec::with_capacity(defaults.len() + extra.len());
        for ability in defaults.iter().chain(extra) {
            if !abilities.contains(ability) {
                abilities.push(*ability);
            }
        }

        Ok(Self {
            template: template.to_owned(),
            abilities,
            location,
            strategy,
        })
    }
}

/// Failures raised while planning spawns.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The spawn template is not registered.
    #[error("spawn template `{0}` is not registered")]
    UnknownTemplate(String),
    /// The policy could not produce its requests.
    #[error("spawn policy failed: {0}")]
    Policy(String),
}
