use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared cleanup handle. Whichever clone runs first consumes the closure;
/// the scope and the caller can both hold one.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Later calls, from this or any clone, do nothing.
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Readable from async continuations; goes false when the owning scope is
/// disposed.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }
}

/// Teardown boundary for one node.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    alive: Rc<Cell<bool>>,
    disposers: RefCell<Vec<Dispose>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                alive: Rc::new(Cell::new(true)),
                disposers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn liveness(&self) -> Liveness {
        Liveness(self.inner.alive.clone())
    }

    pub fn is_disposed(&self) -> bool {
        !self.inner.alive.get()
    }

    /// Registers a cleanup for `dispose`. The returned handle may run it
    /// early; the scope then skips it. On an already disposed scope the
    /// cleanup runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) -> Dispose {
        let d = Dispose::new(disposer);
        if self.is_disposed() {
            d.run();
        } else {
            self.inner.disposers.borrow_mut().push(d.clone());
        }
        d
    }

    /// Marks the scope dead, then runs disposers in registration order.
    /// Later calls do nothing.
    pub fn dispose(&self) {
        if self.inner.alive.replace(false) {
            let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
            for disposer in disposers {
                disposer.run();
            }
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let d = Dispose::new(move || c.set(c.get() + 1));
        let d2 = d.clone();
        d.run();
        d2.run();
        assert_eq!(count.get(), 1);
        assert!(d.is_spent());
    }

    #[test]
    fn test_scope_dispose_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let scope = Scope::new();
        for name in ["a", "b", "c"] {
            let order = order.clone();
            scope.add_disposer(move || order.borrow_mut().push(name));
        }

        let live = scope.liveness();
        assert!(live.is_alive());
        scope.dispose();
        scope.dispose();

        assert!(!live.is_alive());
        assert!(scope.is_disposed());
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_scope_early_dispose_skipped() {
        let count = Rc::new(Cell::new(0));
        let scope = Scope::new();
        let c = count.clone();
        let d = scope.add_disposer(move || c.set(c.get() + 1));
        d.run();
        scope.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scope_add_after_dispose_runs_now() {
        let scope = Scope::new();
        scope.dispose();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        scope.add_disposer(move || r.set(true));
        assert!(ran.get());
    }
}
