use std::cell::Cell;
use std::rc::Rc;

use stead_core::*;

use crate::fetch::UserData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserProfileInputs {
    pub user_id: i64,
}

/// Loads a user on mount and again whenever `user_id` changes.
pub struct UserProfile {
    node: Node<UserProfileInputs>,
    renders: Rc<Cell<usize>>,
}

impl UserProfile {
    pub fn new(
        inputs: UserProfileInputs,
        fetcher: Rc<dyn ResourceFetcher<i64, UserData>>,
    ) -> Self {
        let store = LocalStateStore::with_initial([
            ("user_id", Value::Int(inputs.user_id)),
            ("user_data", Value::Null),
        ]);
        let renders = Rc::new(Cell::new(0));
        {
            let renders = renders.clone();
            store.set_on_change(move || renders.set(renders.get() + 1));
        }

        let id = format!("user-profile-{}", inputs.user_id);
        let node = Node::with_state(id, inputs, store, |cx| {
            let load = {
                let cx = cx.clone();
                move || {
                    let user_id = cx.store().get("user_id").as_i64().unwrap_or_default();
                    cx.apply_when_alive(
                        fetcher.fetch(&user_id),
                        |store, user| {
                            store.set_many([("user_data", user.to_value()), ("error", Value::Null)]);
                        },
                        |store, err| {
                            store.set("error", err.to_string());
                        },
                    );
                }
            };
            let load = Rc::new(load);

            let on_mount = {
                let load = load.clone();
                move || load()
            };
            let on_update = {
                let cx = cx.clone();
                move |prev: &UserProfileInputs, next: &UserProfileInputs| {
                    if prev.user_id != next.user_id {
                        cx.store().set("user_id", next.user_id);
                        load();
                    }
                }
            };
            let on_unmount = {
                let id = cx.id().clone();
                move || log::info!("{id}: UserProfile is about to unmount")
            };

            Callbacks::new()
                .on_mount(on_mount)
                .on_update(on_update)
                .on_unmount(on_unmount)
        });

        Self { node, renders }
    }

    pub fn mount(&mut self) -> Result<(), LifecycleError> {
        self.node.mount()
    }

    pub fn update_inputs(&mut self, inputs: UserProfileInputs) -> Result<bool, LifecycleError> {
        self.node.update_inputs(inputs)
    }

    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        self.node.unmount()
    }

    pub fn node(&self) -> &Node<UserProfileInputs> {
        &self.node
    }

    /// Store notifications seen so far.
    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn view(&self) -> String {
        let state = self.node.snapshot();
        let data = state.get("user_data");
        if data.is_nullish() {
            return match state.get("error").as_str() {
                Some(msg) => format!("Error: {msg}"),
                None => "Loading user data...".to_string(),
            };
        }
        format!(
            "User Profile | Name: {} | Email: {}",
            data.field("name"),
            data.field("email")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::fetch::MockFetcher;

    fn users() -> Vec<UserData> {
        vec![
            UserData {
                id: 1,
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            UserData {
                id: 2,
                name: "Grace".into(),
                email: "grace@example.com".into(),
            },
        ]
    }

    fn setup(user_id: i64) -> (UserProfile, Rc<MockFetcher>, EventQueue) {
        let queue = EventQueue::new();
        let fetcher = Rc::new(MockFetcher::new(users(), queue.clone()));
        let profile = UserProfile::new(UserProfileInputs { user_id }, fetcher.clone());
        (profile, fetcher, queue)
    }

    #[test]
    fn test_profile_loading_then_loaded() {
        let (mut p, fetcher, queue) = setup(1);
        insta::assert_snapshot!(p.view(), @"Loading user data...");

        p.mount().unwrap();
        assert_eq!(fetcher.requests(), vec![1]);
        fetcher.deliver_next();
        queue.run_until_idle();

        insta::assert_snapshot!(p.view(), @"User Profile | Name: Ada | Email: ada@example.com");
        assert_eq!(p.renders(), 1);
    }

    #[test]
    fn test_profile_refetches_on_user_change() {
        let (mut p, fetcher, queue) = setup(1);
        p.mount().unwrap();
        assert!(!p.update_inputs(UserProfileInputs { user_id: 1 }).unwrap());
        assert!(p.update_inputs(UserProfileInputs { user_id: 2 }).unwrap());
        assert_eq!(fetcher.requests(), vec![1, 2]);

        fetcher.deliver_all();
        queue.run_until_idle();
        assert_eq!(
            p.view(),
            "User Profile | Name: Grace | Email: grace@example.com"
        );
    }

    #[test]
    fn test_profile_unknown_user_shows_error() {
        let (mut p, fetcher, queue) = setup(42);
        p.mount().unwrap();
        fetcher.deliver_next();
        queue.run_until_idle();
        insta::assert_snapshot!(p.view(), @"Error: resource not found: users/42");
    }

    #[test]
    fn test_profile_late_response_after_unmount() {
        let (mut p, fetcher, queue) = setup(1);
        p.mount().unwrap();
        p.update_inputs(UserProfileInputs { user_id: 2 }).unwrap();
        let renders = p.renders();
        p.unmount().unwrap();

        fetcher.deliver_all();
        queue.run_until_idle();

        assert_eq!(p.renders(), renders);
        assert_eq!(p.node().stale_drops(), 2);
        assert_eq!(p.view(), "Loading user data...");
        assert!(p.unmount().is_err());
    }
}
