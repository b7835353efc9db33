use thiserror::Error;

use crate::lifecycle::{LifecycleState, Transition};

/// Illegal ordering of driver calls on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid transition: cannot {attempted} from {from}")]
    InvalidTransition {
        from: LifecycleState,
        attempted: Transition,
    },
}

impl LifecycleError {
    pub fn invalid(from: LifecycleState, attempted: Transition) -> Self {
        Self::InvalidTransition { from, attempted }
    }
}

/// Rejection from a resource fetcher. Recovered inside the node, never
/// propagated past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}
