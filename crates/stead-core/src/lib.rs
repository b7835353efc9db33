//! # Nodes, Lifecycle, and Local State
//!
//! Stead models one stateful UI unit (a *node*) without any rendering. A node
//! is a plain struct composed of three pieces:
//!
//! - `LifecycleController<I>` — the `Unmounted → Mounted → Destroyed` state
//!   machine that fires the owner's `on_mount` / `on_update` / `on_unmount`.
//! - `LocalStateStore` — keyed local state; every write notifies the owner
//!   once so it can re-evaluate its output.
//! - `Scope` — teardown boundary; its `Liveness` token tells async
//!   continuations whether the node is still around.
//!
//! ## Local state
//!
//! ```rust
//! use stead_core::*;
//!
//! let store = LocalStateStore::with_initial([("is_visible", true)]);
//! store.set_on_change(|| log::debug!("re-evaluate"));
//!
//! store.update("is_visible", |v| Value::from(!v.as_bool().unwrap_or(false)));
//! assert_eq!(store.get("is_visible"), Value::Bool(false));
//! assert!(store.get("missing").is_undefined());
//! ```
//!
//! `update` always sees the value current at the time of the write, never one
//! captured earlier.
//!
//! ## Lifecycle and async results
//!
//! Callbacks are built with access to a `NodeContext`, which is how they reach
//! the store. Fetch results go through `apply_when_alive`, so a response that
//! lands after `unmount` never touches state:
//!
//! ```rust
//! use stead_core::*;
//!
//! let (pending, resolver) = deferred::<Result<String, FetchError>>();
//! let mut node = Node::new("profile", 1u32, |cx| {
//!     let cx = cx.clone();
//!     Callbacks::new().on_mount(move || {
//!         cx.apply_when_alive(
//!             pending.clone(),
//!             |store, name| { store.set("name", name.as_str()); },
//!             |store, err| { store.set("error", err.to_string()); },
//!         );
//!     })
//! });
//!
//! node.mount().unwrap();
//! node.unmount().unwrap();
//! resolver.resolve(Ok("Ada".into()));
//! assert!(node.store().get("name").is_undefined());
//! ```

pub mod deferred;
pub mod error;
pub mod lifecycle;
pub mod node;
pub mod scope;
pub mod store;
pub mod value;

pub use deferred::*;
pub use error::*;
pub use lifecycle::*;
pub use node::*;
pub use scope::*;
pub use store::*;
pub use value::*;
