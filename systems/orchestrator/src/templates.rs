use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use thiserror::Error;
use tidebot_core::{Ability, Unit, UnitId};

use crate::Strategy;

type Factory = Box<dyn Fn() -> Box<dyn Strategy>>;

struct TemplateEntry {
    abilities: Vec<Ability>,
    factory: Factory,
}

/// Ability signature mapped onto a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleRule {
    template: String,
    abilities: BTreeSet<Ability>,
}

impl RoleRule {
    /// Template selected by the rule.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Reports whether the unit's ability set equals the rule's signature.
    #[must_use]
    pub fn matches(&self, abilities: &[Ability]) -> bool {
        let signature: BTreeSet<Ability> = abilities.iter().copied().collect();
        signature == self.abilities
    }
}

/// Named decision-object factories and the rules that pick one for a unit.
///
/// A unit without a binding resolves to its declared template when that name
/// is registered, otherwise to the first role rule matching its abilities,
/// otherwise to the default template. Strict registries treat a unit that
/// still has no template as an error; lenient ones leave it unmanaged.
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateEntry>,
    roles: Vec<RoleRule>,
    default: Option<String>,
    strict: bool,
}

impl TemplateRegistry {
    /// Creates an empty, lenient registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
            roles: Vec::new(),
            default: None,
            strict: false,
        }
    }

    /// Registers a template together with its default spawn abilities.
    pub fn register<F, S>(
        &mut self,
        name: &str,
        abilities: &[Ability],
        factory: F,
    ) -> Result<(), TemplateError>
    where
        F: Fn() -> S + 'static,
        S: Strategy + 'static,
    {
        if self.templates.contains_key(name) {
            return Err(TemplateError::Duplicate(name.to_owned()));
        }

        let entry = TemplateEntry {
            abilities: abilities.to_vec(),
            factory: Box::new(move || Box::new(factory()) as Box<dyn Strategy>),
        };
        let _ = self.templates.insert(name.to_owned(), entry);
        Ok(())
    }

    /// Adds a role rule selecting `template` for units holding exactly `abilities`.
    pub fn add_role(&mut self, template: &str, abilities: &[Ability]) -> Result<(), TemplateError> {
        self.ensure_registered(template)?;
        self.roles.push(RoleRule {
            template: template.to_owned(),
            abilities: abilities.iter().copied().collect(),
        });
        Ok(())
    }

    /// Selects the template used when nothing else matches.
    pub fn set_default(&mut self, template: &str) -> Result<(), TemplateError> {
        self.ensure_registered(template)?;
        self.default = Some(template.to_owned());
        Ok(())
    }

    /// Switches between strict and lenient resolution.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Reports whether unresolvable units are treated as errors.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Reports whether `template` is registered.
    #[must_use]
    pub fn contains(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    /// Registered template names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Role rules in evaluation order.
    #[must_use]
    pub fn roles(&self) -> &[RoleRule] {
        &self.roles
    }

    /// Template used when nothing else matches.
    #[must_use]
    pub fn default_template(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Default spawn abilities of `template`.
    #[must_use]
    pub fn default_abilities(&self, template: &str) -> Option<&[Ability]> {
        self.templates
            .get(template)
            .map(|entry| entry.abilities.as_slice())
    }

    /// Creates a fresh decision object from `template`.
    pub fn instantiate(&self, template: &str) -> Result<Box<dyn Strategy>, TemplateError> {
        self.templates
            .get(template)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| TemplateError::Unregistered(template.to_owned()))
    }

    /// Resolves the template for a unit that has no binding yet.
    ///
    /// Returns `Ok(None)` when a lenient registry leaves the unit unmanaged.
    pub fn resolve(&self, unit: &Unit) -> Result<Option<&str>, TemplateError> {
        if let Some(declared) = unit.template.as_deref() {
            if let Some((name, _)) = self.templates.get_key_value(declared) {
                return Ok(Some(name.as_str()));
            }
        }

        if let Some(rule) = self.roles.iter().find(|rule| rule.matches(&unit.abilities)) {
            return Ok(Some(rule.template()));
        }

        if let Some(default) = self.default.as_deref() {
            return Ok(Some(default));
        }

        if self.strict {
            Err(TemplateError::UnknownTemplate {
                unit: unit.id,
                declared: unit.template.clone(),
            })
        } else {
            Ok(None)
        }
    }

    fn ensure_registered(&self, template: &str) -> Result<(), TemplateError> {
        if self.contains(template) {
            Ok(())
        } else {
            Err(TemplateError::Unregistered(template.to_owned()))
        }
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("roles", &self.roles)
            .field("default", &self.default)
            .field("strict", &self.strict)
            .finish()
    }
}

/// Failures raised while registering or resolving templates.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A template with the same name already exists.
    #[error("template `{0}` is already registered")]
    Duplicate(String),
    /// The named template does not exist.
    #[error("template `{0}` is not registered")]
    Unregistered(String),
    /// No template could be resolved for a unit.
    #[error("no template resolves for unit {unit} (declared {declared:?})")]
    UnknownTemplate {
        /// Unit that could not be resolved.
        unit: UnitId,
        /// Template name the unit declared, if any.
        declared: Option<String>,
    },
}
