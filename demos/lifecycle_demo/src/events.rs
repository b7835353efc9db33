use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Single-threaded FIFO of pending events. Network completions and input
/// events land here and run one at a time.
#[derive(Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>);

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl FnOnce() + 'static) {
        self.0.borrow_mut().push_back(Box::new(event));
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Runs events, including ones pushed while running, until none are
    /// left. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // pop before running so the event may push more
            let next = self.0.borrow_mut().pop_front();
            let Some(event) = next else { break };
            event();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo_and_reentrant_push() {
        let q = EventQueue::new();
        let out = Rc::new(RefCell::new(Vec::new()));
        {
            let (q2, out) = (q.clone(), out.clone());
            q.push(move || {
                out.borrow_mut().push(1);
                let out = out.clone();
                q2.push(move || out.borrow_mut().push(3));
            });
        }
        {
            let out = out.clone();
            q.push(move || out.borrow_mut().push(2));
        }
        assert_eq!(q.len(), 2);
        assert_eq!(q.run_until_idle(), 3);
        assert_eq!(*out.borrow(), vec![1, 2, 3]);
        assert!(q.is_empty());
    }
}
