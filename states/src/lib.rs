//! Reactive state runtime.
//!
//! - [`State`]: plain values, mutated through [`StateCtx`].
//! - [`Compute`]: derived values that declare their inputs with [`ComputeDeps`] and are
//!   recomputed, dependencies first, whenever one of those inputs changes.
//! - [`Command`]: manually dispatched side effects that report back through an [`Updater`].
//!
//! The dependency [`Graph`] decides the recomputation boundary: changing a state only
//! recomputes the computes downstream of it.

mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod graph;
mod state;
mod state_sync_status;
mod updater;

pub use command::{Command, CommandFuture};
pub use compute::{Compute, ComputeDeps};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use error::Error;
pub use graph::{DepRoute, Graph, TopologyError};
pub use state::State;
pub use state_sync_status::StateSyncStatus;
pub use updater::Updater;
