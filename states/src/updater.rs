use std::{
    any::{Any, TypeId, type_name},
    fmt::{Debug, Formatter},
};

use flume::Sender;
use log::warn;

pub(crate) type Mutation = Box<dyn FnOnce(&mut (dyn Any + Send)) -> bool + Send>;

pub(crate) enum UpdateKind {
    Assign(Box<dyn Any + Send>),
    Mutate(Mutation),
}

pub(crate) struct Update {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) kind: UpdateKind,
}

/// Sending half used by commands to publish results back into a [`StateCtx`](crate::StateCtx).
///
/// Messages are queued and applied on the next `StateCtx::sync_computes`, in send order.
#[derive(Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Debug for Updater {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("queued", &self.send.len())
            .finish()
    }
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    /// Replace the stored value of `T`.
    pub fn set<T: Any + Send>(&self, value: T) {
        self.send_update(Update {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: UpdateKind::Assign(Box::new(value)),
        });
    }

    /// Mutate the stored value of `T` in place.
    ///
    /// The closure runs against the value current at apply time, not at send time.
    pub fn update<T: Any + Send>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        let mutation: Mutation = Box::new(move |value: &mut (dyn Any + Send)| match value
            .downcast_mut::<T>()
        {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        });
        self.send_update(Update {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: UpdateKind::Mutate(mutation),
        });
    }

    fn send_update(&self, update: Update) {
        let name = update.name;
        if self.send.send(update).is_err() {
            warn!("Dropping update for {name}: state context is gone");
        }
    }
}
