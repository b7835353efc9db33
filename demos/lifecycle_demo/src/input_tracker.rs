use std::cell::Cell;
use std::rc::Rc;

use stead_core::*;

/// Mirrors a text field into local state.
pub struct InputTracker {
    node: Node<()>,
    renders: Rc<Cell<usize>>,
}

impl InputTracker {
    pub fn new() -> Self {
        let store = LocalStateStore::with_initial([("user_input", "")]);
        let renders = Rc::new(Cell::new(0));
        {
            let renders = renders.clone();
            store.set_on_change(move || renders.set(renders.get() + 1));
        }
        Self {
            node: Node::with_state("input-tracker", (), store, |_| Callbacks::new()),
            renders,
        }
    }

    pub fn node(&self) -> &Node<()> {
        &self.node
    }

    pub fn mount(&mut self) -> Result<(), LifecycleError> {
        self.node.mount()
    }

    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        self.node.unmount()
    }

    /// The text field's change event. Returns `false` once unmounted.
    pub fn handle_input_change(&self, text: &str) -> bool {
        self.node.store().set("user_input", text)
    }

    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn view(&self) -> String {
        format!("User Input: {}", self.node.store().get("user_input"))
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
