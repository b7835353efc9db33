use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::value::{Snapshot, Value};

/// Keyed local state owned by one node.
///
/// Handles are cheap clones of the same store, so lifecycle callbacks and
/// event handlers can capture one. Every applied `set`/`set_many`/`update`
/// commits a new snapshot and then calls the owner's `on_change` exactly once.
#[derive(Clone)]
pub struct LocalStateStore(Rc<Inner>);

struct Inner {
    slots: RefCell<Rc<BTreeMap<String, Value>>>,
    version: Cell<u64>,
    frozen: Cell<bool>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl LocalStateStore {
    pub fn new() -> Self {
        Self::with_initial(std::iter::empty::<(String, Value)>())
    }

    /// Seeds the initial slots without notifying.
    pub fn with_initial<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let slots = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Rc::new(Inner {
            slots: RefCell::new(Rc::new(slots)),
            version: Cell::new(0),
            frozen: Cell::new(false),
            on_change: RefCell::new(None),
        }))
    }

    /// Installs (or replaces) the owner's re-evaluation callback.
    pub fn set_on_change(&self, f: impl Fn() + 'static) {
        *self.0.on_change.borrow_mut() = Some(Rc::new(f));
    }

    pub fn get(&self, key: &str) -> Value {
        self.0.slots.borrow().get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.slots.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.slots.borrow().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.0.slots.borrow().clone(),
            version: self.0.version.get(),
        }
    }

    pub fn version(&self) -> u64 {
        self.0.version.get()
    }

    /// Replaces one slot. Returns `false` if the store is frozen.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        self.commit(&key, |slots| {
            slots.insert(key.clone(), value);
        })
    }

    /// Replaces several slots at once, leaving the others untouched.
    /// Notifies once for the whole call.
    pub fn set_many<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>) -> bool
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let entries: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let what = entries
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(",");
        self.commit(&what, |slots| {
            slots.extend(entries);
        })
    }

    /// Applies `f` to the slot's value as it is when the write happens.
    /// `f` runs with no borrow held, so it may read other slots.
    pub fn update(&self, key: impl Into<String>, f: impl FnOnce(&Value) -> Value) -> bool {
        let key = key.into();
        if self.0.frozen.get() {
            log::debug!("store: stale write to '{key}' ignored (frozen)");
            return false;
        }
        let current = self.get(&key);
        let next = f(&current);
        self.commit(&key, |slots| {
            slots.insert(key.clone(), next);
        })
    }

    /// Drops every later write. Reads keep working.
    pub fn freeze(&self) {
        self.0.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get()
    }

    fn commit(&self, what: &str, write: impl FnOnce(&mut BTreeMap<String, Value>)) -> bool {
        if self.0.frozen.get() {
            log::debug!("store: stale write to '{what}' ignored (frozen)");
            return false;
        }
        {
            let mut slots = self.0.slots.borrow_mut();
            write(Rc::make_mut(&mut slots));
        }
        self.0.version.set(self.0.version.get() + 1);
        log::debug!("store: wrote '{what}' (v{})", self.0.version.get());

        // borrow released before calling out so the owner may read or write
        let on_change = self.0.on_change.borrow().clone();
        if let Some(f) = on_change {
            f();
        }
        true
    }
}

impl Default for LocalStateStore {
    fn default() -> Self {
        Self::new()
    }
}
