use std::cell::Cell;
use std::rc::Rc;

use stead_core::*;

/// A button that shows and hides a paragraph.
pub struct VisibilityManager {
    node: Node<()>,
    renders: Rc<Cell<usize>>,
}

impl VisibilityManager {
    pub fn new() -> Self {
        let store = LocalStateStore::with_initial([("is_visible", true)]);
        let renders = Rc::new(Cell::new(0));
        {
            let renders = renders.clone();
            store.set_on_change(move || renders.set(renders.get() + 1));
        }
        Self {
            node: Node::with_state("visibility-manager", (), store, |_| Callbacks::new()),
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

    /// Functional update: flips whatever the flag holds right now.
    pub fn toggle_visibility(&self) -> bool {
        self.node
            .store()
            .update("is_visible", |v| Value::from(!v.as_bool().unwrap_or(false)))
    }

    pub fn is_visible(&self) -> bool {
        self.node.store().get("is_visible").as_bool().unwrap_or(false)
    }

    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn view(&self) -> String {
        if self.is_visible() {
            "This component is visible!".to_string()
        } else {
            String::new()
        }
    }
}

impl Default for VisibilityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_in_one_tick() {
        let mut v = VisibilityManager::new();
        v.mount().unwrap();
        assert!(v.is_visible());

        // each toggle reads the value the previous one wrote
        v.toggle_visibility();
        v.toggle_visibility();
        assert!(v.is_visible());
        assert_eq!(v.renders(), 2);

        v.toggle_visibility();
        assert_eq!(v.view(), "");
    }
}
