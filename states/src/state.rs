use std::{any::Any, fmt::Debug};

/// A plain value owned by a [`StateCtx`](crate::StateCtx).
///
/// States are the roots of the dependency graph: they only change through
/// `StateCtx::update`, `StateCtx::set` or an [`Updater`](crate::Updater) message, and every
/// change invalidates the computes that read them.
pub trait State: Any + Debug + Send {}
