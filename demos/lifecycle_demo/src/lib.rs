//! The three instructional nodes, built on `stead-core`:
//!
//! - [`UserProfile`]: fetch on mount, refetch when `user_id` changes, ignore
//!   responses that arrive after unmount.
//! - [`InputTracker`]: one store write (and one re-render) per input event.
//! - [`VisibilityManager`]: a functional update over the current flag.
//!
//! [`Scenario`] drives all three from a JSON script; the `lifecycle_demo`
//! binary prints what each node would show after every step.

pub mod events;
pub mod fetch;
pub mod input_tracker;
pub mod scenario;
pub mod user_profile;
pub mod visibility;

pub use events::EventQueue;
pub use fetch::{MockFetcher, UserData};
pub use input_tracker::InputTracker;
pub use scenario::{Frame, Report, Scenario, ScenarioError, Step};
pub use user_profile::{UserProfile, UserProfileInputs};
pub use visibility::VisibilityManager;
