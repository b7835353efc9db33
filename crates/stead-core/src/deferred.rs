use std::cell::RefCell;
use std::rc::Rc;

use crate::error::FetchError;

/// Single-threaded one-shot value, resolved later through its `Resolver`.
pub struct Deferred<T: 'static> {
    inner: Rc<RefCell<Slot<T>>>,
}

/// Write side of a `Deferred`.
pub struct Resolver<T: 'static> {
    inner: Rc<RefCell<Slot<T>>>,
}

enum Slot<T> {
    Pending(Vec<Box<dyn FnOnce(&T)>>),
    Resolved(Rc<T>),
}

pub fn deferred<T: 'static>() -> (Deferred<T>, Resolver<T>) {
    let inner = Rc::new(RefCell::new(Slot::Pending(Vec::new())));
    (
        Deferred {
            inner: inner.clone(),
        },
        Resolver { inner },
    )
}

impl<T: 'static> Deferred<T> {
    /// Already resolved with `value`.
    pub fn ready(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Slot::Resolved(Rc::new(value)))),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.inner.borrow(), Slot::Resolved(_))
    }

    /// Registers a continuation. Runs right away if the value is in.
    pub fn then(&self, f: impl FnOnce(&T) + 'static) {
        let ready = match &mut *self.inner.borrow_mut() {
            Slot::Pending(waiters) => {
                waiters.push(Box::new(f));
                return;
            }
            Slot::Resolved(v) => v.clone(),
        };
        f(&ready);
    }
}

impl<T: 'static> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Resolver<T> {
    /// Delivers the value to every continuation, in registration order.
    /// Returns `false` if it was already resolved.
    pub fn resolve(&self, value: T) -> bool {
        let value = Rc::new(value);
        let waiters = {
            let mut slot = self.inner.borrow_mut();
            match std::mem::replace(&mut *slot, Slot::Resolved(value.clone())) {
                Slot::Pending(waiters) => waiters,
                first @ Slot::Resolved(_) => {
                    *slot = first;
                    return false;
                }
            }
        };
        for w in waiters {
            w(&value);
        }
        true
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.inner.borrow(), Slot::Resolved(_))
    }
}

/// The network-like collaborator a node calls from its lifecycle callbacks.
pub trait ResourceFetcher<K, D: 'static> {
    fn fetch(&self, key: &K) -> Deferred<Result<D, FetchError>>;
}

impl<K, D: 'static, F> ResourceFetcher<K, D> for F
where
    F: Fn(&K) -> Deferred<Result<D, FetchError>>,
{
    fn fetch(&self, key: &K) -> Deferred<Result<D, FetchError>> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_deferred_resolve_runs_continuations() {
        let (d, r) = deferred::<i32>();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..2 {
            let seen = seen.clone();
            d.then(move |v| seen.borrow_mut().push((tag, *v)));
        }
        assert!(seen.borrow().is_empty());
        assert!(!d.is_resolved());

        assert!(r.resolve(7));
        assert!(!r.resolve(8));
        assert_eq!(*seen.borrow(), vec![(0, 7), (1, 7)]);

        // late continuation still sees the first value
        let late = Rc::new(Cell::new(0));
        let l = late.clone();
        d.then(move |v| l.set(*v));
        assert_eq!(late.get(), 7);
    }

    #[test]
    fn test_deferred_dropped_resolver_stays_pending() {
        let (d, r) = deferred::<()>();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        d.then(move |_| flag.set(true));
        drop(r);
        assert!(!d.is_resolved());
        assert!(!ran.get());
    }

    #[test]
    fn test_closure_fetcher() {
        let fetcher = |id: &u32| -> Deferred<Result<String, FetchError>> {
            if *id == 1 {
                Deferred::ready(Ok("ada".to_string()))
            } else {
                Deferred::ready(Err(FetchError::NotFound(id.to_string())))
            }
        };
        let out = Rc::new(RefCell::new(None));
        let o = out.clone();
        fetcher.fetch(&2).then(move |r| *o.borrow_mut() = Some(r.clone()));
        assert_eq!(*out.borrow(), Some(Err(FetchError::NotFound("2".into()))));
    }
}
