use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use stead_core::{Deferred, FetchError, ResourceFetcher, Resolver, Value, deferred};

use crate::events::EventQueue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl UserData {
    pub fn to_value(&self) -> Value {
        Value::record([
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
        ])
    }
}

type Completion = (i64, Resolver<Result<UserData, FetchError>>);

/// In-memory user directory. Every fetch stays pending until the driver
/// delivers it, and delivery goes through the event queue.
pub struct MockFetcher {
    users: HashMap<i64, UserData>,
    queue: EventQueue,
    pending: RefCell<VecDeque<Completion>>,
    requests: RefCell<Vec<i64>>,
}

impl MockFetcher {
    pub fn new(users: impl IntoIterator<Item = UserData>, queue: EventQueue) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            queue,
            pending: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Every user id requested so far, in order.
    pub fn requests(&self) -> Vec<i64> {
        self.requests.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Schedules the oldest pending response. Returns `false` if none.
    pub fn deliver_next(&self) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        let Some((id, resolver)) = next else {
            return false;
        };
        let result = self
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("users/{id}")));
        self.queue.push(move || {
            log::debug!("fetch users/{id}: delivering");
            resolver.resolve(result);
        });
        true
    }

    pub fn deliver_all(&self) -> usize {
        let mut n = 0;
        while self.deliver_next() {
            n += 1;
        }
        n
    }
}

impl ResourceFetcher<i64, UserData> for MockFetcher {
    fn fetch(&self, key: &i64) -> Deferred<Result<UserData, FetchError>> {
        log::debug!("fetch users/{key}: requested");
        self.requests.borrow_mut().push(*key);
        let (d, r) = deferred();
        self.pending.borrow_mut().push_back((*key, r));
        d
    }
}
