use std::{any::Any, future::Future, pin::Pin};

use crate::{Dep, Updater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Manually dispatched unit of work.
///
/// `run` executes synchronously at dispatch time with read access to the context; anything it
/// needs later must be cloned out of `deps`. The returned future is spawned on the current
/// tokio runtime and reports back through the [`Updater`].
///
/// Messages sent before the future is returned are applied before `dispatch` returns, which
/// is how commands raise "in progress" flags.
pub trait Command: Any + Send + Sync {
    fn run(&self, deps: Dep<'_>, updater: Updater) -> CommandFuture;
}
