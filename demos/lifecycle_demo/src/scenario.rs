//! Scripted driver: a JSON list of steps run against one of each demo node.
//!
//! ```json
//! {
//!   "user_id": 1,
//!   "users": [{ "id": 1, "name": "Ada", "email": "ada@example.com" }],
//!   "steps": [
//!     { "step": "mount" },
//!     { "step": "resolve_next" },
//!     { "step": "update_inputs", "user_id": 2 },
//!     { "step": "unmount" },
//!     { "step": "resolve_all" }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use stead_core::LifecycleError;
use thiserror::Error;

use crate::events::EventQueue;
use crate::fetch::{MockFetcher, UserData};
use crate::input_tracker::InputTracker;
use crate::user_profile::{UserProfile, UserProfileInputs};
use crate::visibility::VisibilityManager;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Mounts every node.
    Mount,
    UpdateInputs {
        user_id: i64,
    },
    /// Delivers the oldest pending fetch.
    ResolveNext,
    ResolveAll,
    /// Unmounts every node.
    Unmount,
    Input {
        text: String,
    },
    Toggle,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Mount => f.write_str("mount"),
            Step::UpdateInputs { user_id } => write!(f, "update_inputs(user_id={user_id})"),
            Step::ResolveNext => f.write_str("resolve_next"),
            Step::ResolveAll => f.write_str("resolve_all"),
            Step::Unmount => f.write_str("unmount"),
            Step::Input { text } => write!(f, "input({text:?})"),
            Step::Toggle => f.write_str("toggle"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {index} ({step}) failed")]
    Step {
        index: usize,
        step: Step,
        #[source]
        source: LifecycleError,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub user_id: i64,
    #[serde(default)]
    pub users: Vec<UserData>,
    pub steps: Vec<Step>,
}

/// Output of every node after one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub step: Step,
    pub profile: String,
    pub input: String,
    pub visibility: String,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} | {} | {} | {}",
            self.step.to_string(),
            self.profile,
            self.input,
            if self.visibility.is_empty() { "-" } else { self.visibility.as_str() }
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    pub frames: Vec<Frame>,
    pub requests: Vec<i64>,
    pub stale_drops: usize,
    pub profile_renders: usize,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Mount, switch user, unmount before the second response lands.
    pub fn builtin() -> Self {
        Self {
            user_id: 1,
            users: vec![
                UserData {
                    id: 1,
                    name: "Ada Lovelace".into(),
                    email: "ada@example.com".into(),
                },
                UserData {
                    id: 2,
                    name: "Grace Hopper".into(),
                    email: "grace@example.com".into(),
                },
            ],
            steps: vec![
                Step::Mount,
                Step::Input { text: "a".into() },
                Step::Input { text: "ab".into() },
                Step::Toggle,
                Step::ResolveNext,
                Step::UpdateInputs { user_id: 2 },
                Step::Unmount,
                Step::ResolveAll,
            ],
        }
    }

    pub fn run(&self) -> Result<Report, ScenarioError> {
        let queue = EventQueue::new();
        let fetcher = Rc::new(MockFetcher::new(self.users.clone(), queue.clone()));
        let mut profile = UserProfile::new(
            UserProfileInputs {
                user_id: self.user_id,
            },
            fetcher.clone(),
        );
        let mut tracker = InputTracker::new();
        let mut visibility = VisibilityManager::new();

        let mut frames = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            log::debug!("scenario: step {index}: {step}");
            let fail = |source| ScenarioError::Step {
                index,
                step: step.clone(),
                source,
            };
            match step {
                Step::Mount => {
                    profile.mount().map_err(fail)?;
                    tracker.mount().map_err(fail)?;
                    visibility.mount().map_err(fail)?;
                }
                Step::UpdateInputs { user_id } => {
                    profile
                        .update_inputs(UserProfileInputs { user_id: *user_id })
                        .map_err(fail)?;
                }
                Step::ResolveNext => {
                    if !fetcher.deliver_next() {
                        log::warn!("scenario: step {index}: nothing to resolve");
                    }
                }
                Step::ResolveAll => {
                    fetcher.deliver_all();
                }
                Step::Unmount => {
                    profile.unmount().map_err(fail)?;
                    tracker.unmount().map_err(fail)?;
                    visibility.unmount().map_err(fail)?;
                }
                Step::Input { text } => {
                    let t = text.clone();
                    let tracker_store = tracker.node().store().clone();
                    queue.push(move || {
                        tracker_store.set("user_input", t);
                    });
                }
                Step::Toggle => {
                    visibility.toggle_visibility();
                }
            }
            queue.run_until_idle();

            frames.push(Frame {
                step: step.clone(),
                profile: profile.view(),
                input: tracker.view(),
                visibility: visibility.view(),
            });
        }

        Ok(Report {
            frames,
            requests: fetcher.requests(),
            stale_drops: profile.node().stale_drops(),
            profile_renders: profile.renders(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenario() {
        let report = Scenario::builtin().run().unwrap();
        assert_eq!(report.requests, vec![1, 2]);
        assert_eq!(report.stale_drops, 1);

        let last = report.frames.last().unwrap();
        insta::assert_snapshot!(
            last.profile,
            @"User Profile | Name: Ada Lovelace | Email: ada@example.com"
        );
        assert_eq!(last.input, "User Input: ab");
        assert_eq!(last.visibility, "");
        assert_eq!(report.frames[0].profile, "Loading user data...");
    }

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "user_id": 3,
            "steps": [
                { "step": "mount" },
                { "step": "resolve_next" },
                { "step": "update_inputs", "user_id": 3 },
                { "step": "input", "text": "hi" }
            ]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert!(scenario.users.is_empty());
        assert_eq!(scenario.steps[2], Step::UpdateInputs { user_id: 3 });

        let report = scenario.run().unwrap();
        assert_eq!(report.requests, vec![3]);
        assert_eq!(
            report.frames[1].profile,
            "Error: resource not found: users/3"
        );
        assert_eq!(report.frames[3].input, "User Input: hi");
    }

    #[test]
    fn test_scenario_illegal_step() {
        let json = r#"{ "user_id": 1, "steps": [{ "step": "unmount" }] }"#;
        let err = Scenario::from_json(json).unwrap().run().unwrap_err();
        match err {
            ScenarioError::Step { index, step, source } => {
                assert_eq!(index, 0);
                assert_eq!(step, Step::Unmount);
                assert!(matches!(source, LifecycleError::InvalidTransition { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scenario_bad_json() {
        let err = Scenario::from_json(r#"{ "steps": [{ "step": "jump" }] }"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }
}
