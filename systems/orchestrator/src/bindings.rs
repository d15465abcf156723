use std::collections::BTreeMap;

use tidebot_core::UnitId;

use crate::Strategy;

/// How a binding came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingOrigin {
    /// Created when the unit first appeared in a snapshot.
    Adopted {
        /// Tick the unit was adopted on.
        tick: u64,
    },
    /// Pre-registered when the client requested the unit's spawn.
    Spawned {
        /// Tick the spawn was requested on.
        tick: u64,
    },
}

/// Persistent association between a unit and its decision object.
#[derive(Debug)]
pub struct Binding {
    serial: u64,
    template: String,
    origin: BindingOrigin,
    seen_alive: bool,
    strategy: Box<dyn Strategy>,
}

impl Binding {
    /// Creation serial; a fresh binding for the same unit gets a new serial.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Template the decision object was created from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// How the binding came to exist.
    #[must_use]
    pub const fn origin(&self) -> BindingOrigin {
        self.origin
    }

    /// Reports whether the unit has appeared in a snapshot since binding.
    #[must_use]
    pub const fn seen_alive(&self) -> bool {
        self.seen_alive
    }

    /// Read access to the decision object.
    #[must_use]
    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub(crate) fn mark_alive(&mut self) {
        self.seen_alive = true;
    }

    pub(crate) fn strategy_mut(&mut self) -> &mut dyn Strategy {
        self.strategy.as_mut()
    }
}

/// Table mapping each unit to at most one binding.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: BTreeMap<UnitId, Binding>,
    next_serial: u64,
}

impl BindingTable {
    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Reports whether the table holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Reports whether `unit` is bound.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.bindings.contains_key(&unit)
    }

    /// Binding for `unit`, if any.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&Binding> {
        self.bindings.get(&unit)
    }

    /// Bound units in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.bindings.keys().copied()
    }

    pub(crate) fn get_mut(&mut self, unit: UnitId) -> Option<&mut Binding> {
        self.bindings.get_mut(&unit)
    }

    /// Stores a new binding and returns its serial.
    pub(crate) fn bind(
        &mut self,
        unit: UnitId,
        template: &str,
        origin: BindingOrigin,
        strategy: Box<dyn Strategy>,
    ) -> u64 {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        let binding = Binding {
            serial,
            template: template.to_owned(),
            origin,
            seen_alive: false,
            strategy,
        };
        let _ = self.bindings.insert(unit, binding);
        serial
    }

    /// Removes and returns every binding rejected by `keep`, in ascending order.
    pub(crate) fn drain_unless<F>(&mut self, mut keep: F) -> Vec<(UnitId, Binding)>
    where
        F: FnMut(UnitId) -> bool,
    {
        let doomed: Vec<UnitId> = self
            .bindings
            .keys()
            .copied()
            .filter(|unit| !keep(*unit))
            .collect();

        doomed
            .into_iter()
            .filter_map(|unit| self.bindings.remove(&unit).map(|binding| (unit, binding)))
            .collect()
    }
}
