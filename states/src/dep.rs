use std::{
    any::{TypeId, type_name},
    collections::BTreeMap,
};

use crate::{Compute, Error, State, ctx::Slot};

/// Read-only view over every registered state and compute.
#[derive(Clone, Copy)]
pub struct Dep<'a> {
    slots: &'a BTreeMap<TypeId, Slot>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(slots: &'a BTreeMap<TypeId, Slot>) -> Self {
        Self { slots }
    }

    pub fn state<T: State>(&self) -> Result<&'a T, Error> {
        self.slots
            .get(&TypeId::of::<T>())
            .filter(|slot| !slot.is_compute())
            .and_then(|slot| slot.value.downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "read through Dep"))
    }

    pub fn compute<T: Compute>(&self) -> Result<&'a T, Error> {
        self.slots
            .get(&TypeId::of::<T>())
            .filter(|slot| slot.is_compute())
            .and_then(|slot| slot.value.downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "read through Dep"))
    }
}
