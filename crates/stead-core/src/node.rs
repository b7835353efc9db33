use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::deferred::Deferred;
use crate::error::{FetchError, LifecycleError};
use crate::lifecycle::{Callbacks, LifecycleController, LifecycleState};
use crate::scope::{Dispose, Liveness, Scope};
use crate::store::LocalStateStore;
use crate::value::Snapshot;

/// Caller-supplied identity of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(Rc<str>);

impl NodeId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// What lifecycle callbacks get to capture: the node's store, its liveness
/// and a place to hang cleanups.
#[derive(Clone)]
pub struct NodeContext {
    id: NodeId,
    store: LocalStateStore,
    scope: Scope,
    stale: Rc<Cell<usize>>,
}

impl NodeContext {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn store(&self) -> &LocalStateStore {
        &self.store
    }

    pub fn liveness(&self) -> Liveness {
        self.scope.liveness()
    }

    /// Runs `f` when the node unmounts, after `on_unmount`.
    pub fn on_cleanup(&self, f: impl FnOnce() + 'static) -> Dispose {
        self.scope.add_disposer(f)
    }

    /// Wires a pending fetch into the store. A result that arrives after the
    /// node is gone is dropped; a failure goes to `on_err` and stops there.
    pub fn apply_when_alive<D: 'static>(
        &self,
        pending: Deferred<Result<D, FetchError>>,
        on_ok: impl FnOnce(&LocalStateStore, &D) + 'static,
        on_err: impl FnOnce(&LocalStateStore, &FetchError) + 'static,
    ) {
        let live = self.scope.liveness();
        let store = self.store.clone();
        let stale = self.stale.clone();
        let id = self.id.clone();
        pending.then(move |result| {
            if !live.is_alive() {
                stale.set(stale.get() + 1);
                log::debug!("node {id}: stale result ignored after unmount");
                return;
            }
            match result {
                Ok(data) => on_ok(&store, data),
                Err(e) => {
                    log::warn!("node {id}: fetch failed: {e}");
                    on_err(&store, e)
                }
            }
        });
    }
}

/// One stateful unit: identity, local state and the lifecycle that guards it.
pub struct Node<I> {
    cx: NodeContext,
    controller: LifecycleController<I>,
}

impl<I: PartialEq + Clone> Node<I> {
    pub fn new(
        id: impl Into<NodeId>,
        inputs: I,
        build: impl FnOnce(&NodeContext) -> Callbacks<I>,
    ) -> Self {
        Self::with_state(id, inputs, LocalStateStore::new(), build)
    }

    /// Like `new`, with a pre-seeded store.
    pub fn with_state(
        id: impl Into<NodeId>,
        inputs: I,
        store: LocalStateStore,
        build: impl FnOnce(&NodeContext) -> Callbacks<I>,
    ) -> Self {
        let cx = NodeContext {
            id: id.into(),
            store,
            scope: Scope::new(),
            stale: Rc::new(Cell::new(0)),
        };
        let callbacks = build(&cx);
        Self {
            controller: LifecycleController::new(inputs, callbacks),
            cx,
        }
    }

    pub fn with_callbacks(id: impl Into<NodeId>, inputs: I, callbacks: Callbacks<I>) -> Self {
        Self::new(id, inputs, |_| callbacks)
    }

    pub fn id(&self) -> &NodeId {
        &self.cx.id
    }

    pub fn context(&self) -> &NodeContext {
        &self.cx
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    pub fn inputs(&self) -> &I {
        self.controller.inputs()
    }

    pub fn store(&self) -> &LocalStateStore {
        &self.cx.store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cx.store.snapshot()
    }

    /// Async results dropped because they landed after unmount.
    pub fn stale_drops(&self) -> usize {
        self.cx.stale.get()
    }

    pub fn mount(&mut self) -> Result<(), LifecycleError> {
        log::debug!("node {}: mount", self.cx.id);
        self.controller.mount()
    }

    /// Returns whether `on_update` fired.
    pub fn update_inputs(&mut self, next: I) -> Result<bool, LifecycleError> {
        log::debug!("node {}: update inputs", self.cx.id);
        self.controller.update_inputs(next)
    }

    /// Fires `on_unmount`, then runs cleanups and freezes the store.
    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        log::debug!("node {}: unmount", self.cx.id);
        self.controller.unmount()?;
        self.cx.scope.dispose();
        self.cx.store.freeze();
        Ok(())
    }
}

impl<I> Drop for Node<I> {
    fn drop(&mut self) {
        // dropped without unmount: still cut off pending results
        if !self.cx.scope.is_disposed() {
            self.cx.scope.dispose();
            self.cx.store.freeze();
        }
    }
}
