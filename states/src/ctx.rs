use std::{
    any::{Any, TypeId, type_name},
    collections::BTreeMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};

use flume::{Receiver, Sender};
use log::{debug, error, warn};
use tokio::{runtime::Handle, task::JoinSet};

use crate::{
    Command, Compute, Dep, Error, Graph, State, StateSyncStatus, Updater,
    updater::{Update, UpdateKind},
};

type ComputeFn = fn(&(dyn Any + Send), Dep<'_>) -> Result<Box<dyn Any + Send>, Error>;

fn run_compute<T: Compute>(
    current: &(dyn Any + Send),
    deps: Dep<'_>,
) -> Result<Box<dyn Any + Send>, Error> {
    let current = current
        .downcast_ref::<T>()
        .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "stored value type mismatch"))?;
    Ok(Box::new(current.compute(deps)?))
}

#[derive(Clone, Copy)]
pub(crate) enum SlotKind {
    State,
    Compute(ComputeFn),
}

pub(crate) struct Slot {
    pub(crate) name: &'static str,
    pub(crate) value: Box<dyn Any + Send>,
    pub(crate) kind: SlotKind,
    pub(crate) status: StateSyncStatus,
    pub(crate) generation: u64,
}

impl Slot {
    pub(crate) fn is_compute(&self) -> bool {
        matches!(self.kind, SlotKind::Compute(_))
    }
}

/// Owner of every state, compute and command.
///
/// Mutations go through [`StateCtx::update`] / [`StateCtx::set`] (synchronous) or through an
/// [`Updater`] (applied by [`StateCtx::sync_computes`]). Either way the transitive dependents
/// of the changed value are marked dirty and recomputed in topological order before the call
/// returns, so `cached` never hands out a stale value.
pub struct StateCtx {
    slots: BTreeMap<TypeId, Slot>,
    graph: Graph<TypeId>,
    // computes, dependencies first
    order: Vec<TypeId>,
    commands: BTreeMap<TypeId, (&'static str, Arc<dyn Command>)>,

    send: Sender<Update>,
    recv: Receiver<Update>,
    tasks: JoinSet<()>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for StateCtx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field(
                "slots",
                &self
                    .slots
                    .values()
                    .map(|slot| (slot.name, slot.status, slot.generation))
                    .collect::<Vec<_>>(),
            )
            .field(
                "commands",
                &self.commands.values().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();

        Self {
            slots: BTreeMap::new(),
            graph: Graph::new(),
            order: Vec::new(),
            commands: BTreeMap::new(),
            send,
            recv,
            tasks: JoinSet::new(),
        }
    }

    /// Register a state. Registering the same type again replaces the value.
    pub fn add_state<T: State>(&mut self, state: T) {
        let id = TypeId::of::<T>();
        let generation = self.slots.get(&id).map_or(0, |slot| slot.generation + 1);
        self.slots.insert(
            id,
            Slot {
                name: type_name::<T>(),
                value: Box::new(state),
                kind: SlotKind::State,
                status: StateSyncStatus::Clean,
                generation,
            },
        );
        self.invalidate(id);
    }

    /// Register a compute and wire its dependencies into the graph.
    ///
    /// Fails when the new edges would close a cycle; the compute is then not registered.
    /// The compute first runs on the next [`StateCtx::run_computed`].
    pub fn record_compute<T: Compute>(&mut self, compute: T) -> Result<(), Error> {
        let id = TypeId::of::<T>();
        let deps = compute.deps();

        self.graph.remove_routes_to(id);
        for dep in deps.iter() {
            self.graph.route_to(dep, id);
        }

        self.slots.insert(
            id,
            Slot {
                name: type_name::<T>(),
                value: Box::new(compute),
                kind: SlotKind::Compute(run_compute::<T>),
                status: StateSyncStatus::BeforeInit,
                generation: 0,
            },
        );

        match self.graph.topology_sort() {
            Ok(sorted) => {
                self.order = self.compute_order(sorted);
                self.invalidate(id);
                Ok(())
            }
            Err(err) => {
                self.graph.remove_routes_to(id);
                self.slots.remove(&id);
                Err(err.into())
            }
        }
    }

    fn compute_order(&self, sorted: Vec<TypeId>) -> Vec<TypeId> {
        let mut order: Vec<TypeId> = sorted
            .into_iter()
            .filter(|id| self.slots.get(id).is_some_and(Slot::is_compute))
            .collect();

        // computes without dependencies never appear on a route
        for (id, slot) in &self.slots {
            if slot.is_compute() && !order.contains(id) {
                order.push(*id);
            }
        }

        order
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands
            .insert(TypeId::of::<C>(), (type_name::<C>(), Arc::new(command)));
    }

    pub fn state<T: State>(&self) -> Result<&T, Error> {
        Dep::new(&self.slots).state::<T>()
    }

    /// Latest value of a compute.
    pub fn cached<T: Compute>(&self) -> Result<&T, Error> {
        Dep::new(&self.slots).compute::<T>()
    }

    pub fn status<T: Any>(&self) -> Option<StateSyncStatus> {
        self.slots.get(&TypeId::of::<T>()).map(|slot| slot.status)
    }

    /// How many times a value has been replaced or recomputed since registration.
    pub fn generation<T: Any>(&self) -> Option<u64> {
        self.slots
            .get(&TypeId::of::<T>())
            .map(|slot| slot.generation)
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Mutate a state in place, then recompute its dependents.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) -> Result<(), Error> {
        self.update_deferred(f)?;
        self.run_computed()
    }

    /// Mutate a state and mark its dependents dirty without recomputing them.
    ///
    /// Batches several mutations into one recomputation; call [`StateCtx::run_computed`]
    /// before reading any compute.
    pub fn update_deferred<T: State>(&mut self, f: impl FnOnce(&mut T)) -> Result<(), Error> {
        let id = TypeId::of::<T>();
        let state = self
            .slots
            .get_mut(&id)
            .filter(|slot| !slot.is_compute())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "StateCtx::update"))?;
        let value = state
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "stored value type mismatch"))?;

        f(value);
        state.generation += 1;

        self.invalidate(id);
        Ok(())
    }

    pub fn set<T: State>(&mut self, value: T) -> Result<(), Error> {
        self.update::<T>(|state| *state = value)
    }

    fn invalidate(&mut self, id: TypeId) {
        for dependent in self.graph.connected(id) {
            if let Some(slot) = self.slots.get_mut(dependent)
                && slot.status == StateSyncStatus::Clean
            {
                slot.status = StateSyncStatus::Dirty;
            }
        }
    }

    /// Recompute every dirty compute, dependencies first.
    pub fn run_computed(&mut self) -> Result<(), Error> {
        for index in 0..self.order.len() {
            let Some(&id) = self.order.get(index) else {
                break;
            };
            let Some(slot) = self.slots.get(&id) else {
                continue;
            };
            let SlotKind::Compute(run) = slot.kind else {
                continue;
            };
            if slot.status == StateSyncStatus::Clean {
                continue;
            }

            let next = run(slot.value.as_ref(), Dep::new(&self.slots))?;

            if let Some(slot) = self.slots.get_mut(&id) {
                slot.value = next;
                slot.status = StateSyncStatus::Clean;
                slot.generation += 1;
                debug!("Recomputed {} (generation {})", slot.name, slot.generation);
            }
        }

        Ok(())
    }

    /// Apply every queued [`Updater`] message, then recompute.
    pub fn sync_computes(&mut self) -> Result<(), Error> {
        let updates: Vec<Update> = self.recv.try_iter().collect();
        for update in updates {
            self.apply(update);
        }
        self.run_computed()
    }

    fn apply(&mut self, update: Update) {
        let Update { id, name, kind } = update;
        let Some(slot) = self.slots.get_mut(&id) else {
            warn!("Dropping update for unregistered {name}");
            return;
        };

        match kind {
            UpdateKind::Assign(value) => slot.value = value,
            UpdateKind::Mutate(mutation) => {
                if !mutation(slot.value.as_mut()) {
                    warn!("Dropping update for {name}: stored value type mismatch");
                    return;
                }
            }
        }
        // a compute assigned by a command holds a fresh value until its inputs change
        slot.status = StateSyncStatus::Clean;
        slot.generation += 1;

        self.invalidate(id);
    }

    /// Run a recorded command.
    ///
    /// The synchronous part runs immediately and its updates are applied before returning;
    /// the async part is spawned on the current tokio runtime.
    pub fn dispatch<C: Command>(&mut self) -> Result<(), Error> {
        let (name, command) = self
            .commands
            .get(&TypeId::of::<C>())
            .cloned()
            .ok_or(Error::CommandNotFound {
                name: type_name::<C>(),
            })?;
        let Ok(handle) = Handle::try_current() else {
            return Err(Error::NoRuntime { name });
        };

        debug!("Dispatching {name}");
        let future = command.run(Dep::new(&self.slots), self.updater());
        self.tasks.spawn_on(future, &handle);

        self.sync_computes()
    }

    /// Number of dispatched commands that have not been awaited by [`StateCtx::flush`].
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every dispatched command, then apply their updates.
    pub async fn flush(&mut self) -> Result<(), Error> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                error!("Command task failed: {err}");
            }
        }
        self.sync_computes()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{CommandFuture, ComputeDeps};

    #[derive(Debug, Default)]
    struct Numbers(Vec<i64>);
    impl State for Numbers {}

    #[derive(Debug, Default)]
    struct Factor(i64);
    impl State for Factor {}

    #[derive(Debug, Default)]
    struct Total(i64);

    impl Compute for Total {
        fn deps(&self) -> ComputeDeps {
            ComputeDeps::new().state::<Numbers>()
        }

        fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
            Ok(Self(deps.state::<Numbers>()?.0.iter().sum()))
        }
    }

    #[derive(Debug, Default)]
    struct Scaled(i64);

    impl Compute for Scaled {
        fn deps(&self) -> ComputeDeps {
            ComputeDeps::new().compute::<Total>().state::<Factor>()
        }

        fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
            Ok(Self(deps.compute::<Total>()?.0 * deps.state::<Factor>()?.0))
        }
    }

    fn setup_ctx() -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(Numbers(vec![1, 2, 3]));
        ctx.add_state(Factor(10));
        // registered out of order on purpose
        ctx.record_compute(Scaled::default()).expect("no cycle");
        ctx.record_compute(Total::default()).expect("no cycle");
        ctx.run_computed().expect("initial compute");
        ctx
    }

    #[test]
    fn computes_run_in_dependency_order() {
        let ctx = setup_ctx();

        assert_eq!(ctx.cached::<Total>().expect("total").0, 6);
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 60);
    }

    #[test]
    fn update_recomputes_only_downstream() {
        let mut ctx = setup_ctx();
        let total_gen = ctx.generation::<Total>();
        let scaled_gen = ctx.generation::<Scaled>();

        ctx.update::<Factor>(|f| f.0 = 2).expect("factor registered");

        assert_eq!(ctx.generation::<Total>(), total_gen, "total does not read factor");
        assert_eq!(ctx.generation::<Scaled>(), scaled_gen.map(|g| g + 1));
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 12);

        ctx.update::<Numbers>(|n| n.0.push(4)).expect("numbers registered");
        assert_eq!(ctx.cached::<Total>().expect("total").0, 10);
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 20);
        assert_eq!(ctx.status::<Scaled>(), Some(StateSyncStatus::Clean));
    }

    #[test]
    fn deferred_updates_recompute_once() {
        let mut ctx = setup_ctx();
        let scaled_gen = ctx.generation::<Scaled>().expect("scaled");

        ctx.update_deferred::<Factor>(|f| f.0 = 3).expect("factor registered");
        ctx.update_deferred::<Numbers>(|n| n.0 = vec![1]).expect("numbers registered");
        assert_eq!(ctx.status::<Scaled>(), Some(StateSyncStatus::Dirty));

        ctx.run_computed().expect("recompute");
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 3);
        assert_eq!(ctx.generation::<Scaled>(), Some(scaled_gen + 1));
    }

    #[test]
    fn missing_state_is_an_error() {
        let mut ctx = StateCtx::new();
        ctx.record_compute(Total::default()).expect("no cycle");

        let err = ctx.run_computed().expect_err("numbers is not registered");
        assert!(matches!(err, Error::StateNotFound { .. }));
        assert!(ctx.update::<Factor>(|f| f.0 = 1).is_err());
    }

    #[derive(Debug, Default)]
    struct Loop(i64);

    impl Compute for Loop {
        fn deps(&self) -> ComputeDeps {
            ComputeDeps::new().compute::<Self>()
        }

        fn compute(&self, _deps: Dep<'_>) -> Result<Self, Error> {
            Ok(Self(self.0))
        }
    }

    #[test]
    fn cyclic_compute_is_rejected() {
        let mut ctx = setup_ctx();

        let err = ctx.record_compute(Loop::default()).expect_err("self loop");
        assert!(matches!(err, Error::Topology(_)));
        assert!(ctx.cached::<Loop>().is_err());
        // the rest of the graph is still usable
        ctx.update::<Factor>(|f| f.0 = 1).expect("factor registered");
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 6);
    }

    struct AppendLater {
        value: i64,
    }

    impl Command for AppendLater {
        fn run(&self, deps: Dep<'_>, updater: Updater) -> CommandFuture {
            let factor = deps.state::<Factor>().map(|f| f.0).unwrap_or_default();
            let value = self.value * factor;
            updater.update::<Factor>(|f| f.0 += 1);

            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                updater.update::<Numbers>(move |n| n.0.push(value));
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_applies_sync_part_then_flush_applies_async_part() {
        let mut ctx = setup_ctx();
        ctx.record_command(AppendLater { value: 4 });

        ctx.dispatch::<AppendLater>().expect("command registered");
        assert_eq!(ctx.state::<Factor>().expect("factor").0, 11);
        assert_eq!(ctx.cached::<Total>().expect("total").0, 6);
        assert_eq!(ctx.in_flight(), 1);

        ctx.flush().await.expect("flush");
        assert_eq!(ctx.cached::<Total>().expect("total").0, 46);
        assert_eq!(ctx.cached::<Scaled>().expect("scaled").0, 46 * 11);
        assert_eq!(ctx.in_flight(), 0);
    }

    #[test]
    fn dispatch_outside_runtime_fails() {
        let mut ctx = setup_ctx();
        ctx.record_command(AppendLater { value: 1 });

        let err = ctx.dispatch::<AppendLater>().expect_err("no runtime");
        assert!(matches!(err, Error::NoRuntime { .. }));
    }

    #[test]
    fn dispatch_unknown_command_fails() {
        let mut ctx = setup_ctx();

        let err = ctx.dispatch::<AppendLater>().expect_err("not recorded");
        assert!(matches!(err, Error::CommandNotFound { .. }));
    }

    #[test]
    fn updater_set_replaces_value() {
        let mut ctx = setup_ctx();

        ctx.updater().set(Numbers(vec![5]));
        assert_eq!(ctx.cached::<Total>().expect("total").0, 6, "not applied yet");

        ctx.sync_computes().expect("sync");
        assert_eq!(ctx.cached::<Total>().expect("total").0, 5);
    }
}
