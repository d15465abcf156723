#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in decision templates.
//!
//! Every template is a [`Strategy`](tidebot_system_orchestrator::Strategy)
//! with its own default spawn abilities. [`register_builtin`] installs all of
//! them into a [`TemplateRegistry`] under the names exported from this crate.

mod flash_scout;
mod forager;
mod heat_seeker;
mod lurker;
mod navigate;
mod saboteur;

pub use flash_scout::FlashScout;
pub use forager::{Forager, FULL_LOAD};
pub use heat_seeker::HeatSeeker;
pub use lurker::Lurker;
pub use saboteur::Saboteur;

use tidebot_system_orchestrator::{TemplateError, TemplateRegistry};

/// Template name of [`Forager`].
pub const FORAGER: &str = "forager";
/// Template name of [`FlashScout`].
pub const FLASH_SCOUT: &str = "flash_scout";
/// Template name of [`HeatSeeker`].
pub const HEAT_SEEKER: &str = "heat_seeker";
/// Template name of [`Lurker`].
pub const LURKER: &str = "lurker";
/// Template name of [`Saboteur`].
pub const SABOTEUR: &str = "saboteur";

/// Registers every built-in template.
pub fn register_builtin(registry: &mut TemplateRegistry) -> Result<(), TemplateError> {
    registry.register(FORAGER, Forager::ABILITIES, Forager::default)?;
    registry.register(FLASH_SCOUT, FlashScout::ABILITIES, FlashScout::default)?;
    registry.register(HEAT_SEEKER, HeatSeeker::ABILITIES, HeatSeeker::default)?;
    registry.register(LURKER, Lurker::ABILITIES, Lurker::default)?;
    registry.register(SABOTEUR, Saboteur::ABILITIES, Saboteur::default)?;
    Ok(())
}

/// Registry holding every built-in template, lenient and without a default.
pub fn builtin_registry() -> Result<TemplateRegistry, TemplateError> {
    let mut registry = TemplateRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidebot_core::Ability;

    #[test]
    fn builtin_templates_carry_default_abilities() {
        let registry = builtin_registry().expect("builtin registry");

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![FLASH_SCOUT, FORAGER, HEAT_SEEKER, LURKER, SABOTEUR]
        );
        assert_eq!(
            registry.default_abilities(FORAGER),
            Some(&[Ability::Harvest, Ability::Scout][..])
        );
        assert_eq!(
            registry.default_abilities(HEAT_SEEKER),
            Some(&[Ability::Speed, Ability::SelfDestruct][..])
        );
        assert_eq!(
            registry.default_abilities(LURKER),
            Some(&[Ability::Shield][..])
        );
    }

    #[test]
    fn registering_twice_is_refused() {
        let mut registry = builtin_registry().expect("builtin registry");
        assert_eq!(
            register_builtin(&mut registry),
            Err(TemplateError::Duplicate(FORAGER.to_owned()))
        );
    }
}
