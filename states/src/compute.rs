use std::{
    any::{Any, TypeId},
    fmt::Debug,
};

use crate::{Dep, Error, State};

/// Declared inputs of a [`Compute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeDeps {
    states: Vec<TypeId>,
    computes: Vec<TypeId>,
}

impl ComputeDeps {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state<T: State>(mut self) -> Self {
        self.states.push(TypeId::of::<T>());
        self
    }

    #[must_use]
    pub fn compute<T: Compute>(mut self) -> Self {
        self.computes.push(TypeId::of::<T>());
        self
    }

    pub fn states(&self) -> &[TypeId] {
        &self.states
    }

    pub fn computes(&self) -> &[TypeId] {
        &self.computes
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.states.iter().chain(self.computes.iter()).copied()
    }
}

/// A value derived from states and other computes.
///
/// `compute` must be pure: it reads its inputs through [`Dep`] and returns the next value.
/// Side effects belong in a [`Command`](crate::Command).
pub trait Compute: Any + Debug + Send + Sized {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>) -> Result<Self, Error>;
}
