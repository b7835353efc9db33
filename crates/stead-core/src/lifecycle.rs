//! # Lifecycle
//!
//! A node moves through three states:
//!
//! ```text
//! Unmounted --mount--> Mounted --unmount--> Destroyed
//!                       |   ^
//!                       +---+ update (gated)
//! ```
//!
//! `LifecycleController` enforces that ordering and fires the owner's
//! callbacks at each legal transition. Illegal calls return
//! `LifecycleError::InvalidTransition` and leave the controller untouched.
//!
//! ```rust
//! use stead_core::*;
//!
//! let mut ctl = LifecycleController::new(
//!     1u32,
//!     Callbacks::new().on_update(|prev: &u32, next: &u32| log::info!("{prev} -> {next}")),
//! );
//! ctl.mount().unwrap();
//! ctl.update_inputs(2).unwrap();
//! ctl.unmount().unwrap();
//! assert!(ctl.mount().is_err());
//! ```

use std::fmt;

use crate::error::LifecycleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unmounted,
    Mounted,
    Destroyed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Unmounted => "unmounted",
            LifecycleState::Mounted => "mounted",
            LifecycleState::Destroyed => "destroyed",
        })
    }
}

/// The driver call being attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Mount,
    Update,
    Unmount,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Mount => "mount",
            Transition::Update => "update",
            Transition::Unmount => "unmount",
        })
    }
}

type UpdateFn<I> = Box<dyn FnMut(&I, &I)>;
type GateFn<I> = Box<dyn Fn(&I, &I) -> bool>;

/// Callbacks a node owner supplies at construction. All optional.
pub struct Callbacks<I> {
    on_mount: Option<Box<dyn FnMut()>>,
    on_update: Option<UpdateFn<I>>,
    on_unmount: Option<Box<dyn FnOnce()>>,
    should_update: Option<GateFn<I>>,
}

impl<I> Callbacks<I> {
    pub fn new() -> Self {
        Self {
            on_mount: None,
            on_update: None,
            on_unmount: None,
            should_update: None,
        }
    }

    pub fn on_mount(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_mount = Some(Box::new(f));
        self
    }

    /// Receives `(prev_inputs, next_inputs)`.
    pub fn on_update(mut self, f: impl FnMut(&I, &I) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_unmount(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_unmount = Some(Box::new(f));
        self
    }

    /// Replaces the default `prev != next` update gate.
    pub fn should_update(mut self, f: impl Fn(&I, &I) -> bool + 'static) -> Self {
        self.should_update = Some(Box::new(f));
        self
    }
}

impl<I> Default for Callbacks<I> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LifecycleController<I> {
    state: LifecycleState,
    inputs: I,
    callbacks: Callbacks<I>,
}

impl<I: PartialEq + Clone> LifecycleController<I> {
    /// Starts in `Unmounted`. Nothing fires until `mount`.
    pub fn new(initial_inputs: I, callbacks: Callbacks<I>) -> Self {
        Self {
            state: LifecycleState::Unmounted,
            inputs: initial_inputs,
            callbacks,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Last-seen inputs.
    pub fn inputs(&self) -> &I {
        &self.inputs
    }

    pub fn is_mounted(&self) -> bool {
        self.state == LifecycleState::Mounted
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    pub fn mount(&mut self) -> Result<(), LifecycleError> {
        self.require(LifecycleState::Unmounted, Transition::Mount)?;
        self.state = LifecycleState::Mounted;
        log::debug!("lifecycle: mounted");
        if let Some(f) = self.callbacks.on_mount.as_mut() {
            f();
        }
        Ok(())
    }

    /// Records `next` as the last-seen inputs, then runs the update gate over
    /// `prev`/`next` and fires `on_update` if it passes. A closed gate is not
    /// an error.
    pub fn notify_inputs_changed(&mut self, prev: &I, next: I) -> Result<bool, LifecycleError> {
        self.require(LifecycleState::Mounted, Transition::Update)?;
        self.inputs = next;
        Ok(run_update(&mut self.callbacks, prev, &self.inputs))
    }

    /// Driver-facing update: `prev` is the last-seen inputs.
    pub fn update_inputs(&mut self, next: I) -> Result<bool, LifecycleError> {
        let prev = self.inputs.clone();
        self.notify_inputs_changed(&prev, next)
    }

    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        self.require(LifecycleState::Mounted, Transition::Unmount)?;
        self.state = LifecycleState::Destroyed;
        log::debug!("lifecycle: destroyed");
        if let Some(f) = self.callbacks.on_unmount.take() {
            f();
        }
        // nothing can fire any more
        self.callbacks = Callbacks::new();
        Ok(())
    }

    fn require(&self, want: LifecycleState, attempted: Transition) -> Result<(), LifecycleError> {
        if self.state == want {
            Ok(())
        } else {
            log::debug!("lifecycle: rejected {attempted} from {}", self.state);
            Err(LifecycleError::invalid(self.state, attempted))
        }
    }
}

fn run_update<I: PartialEq>(callbacks: &mut Callbacks<I>, prev: &I, next: &I) -> bool {
    let pass = match callbacks.should_update.as_ref() {
        Some(gate) => gate(prev, next),
        None => prev != next,
    };
    if !pass {
        log::debug!("lifecycle: update gate closed");
        return false;
    }
    log::debug!("lifecycle: updated");
    if let Some(f) = callbacks.on_update.as_mut() {
        f(prev, next);
    }
    true
}
