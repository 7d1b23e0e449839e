//! Error types for the layout engine.
//!
//! This module provides the unified error type returned by the desktop
//! model, the resolvers, the configuration store, and the client API.
//! Resolver invalidity (an unsnappable drag target) is deliberately *not*
//! represented here — see [`crate::engine::snap_resolver::Validity`], which
//! is a normal value, not an error.

use std::fmt;

use crate::engine::window::WindowId;

/// Errors that can occur while operating the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A window or group id referenced by a request does not exist.
    NotFound(String),
    /// A scope or a rule attached to a configuration entry violates the
    /// scope hierarchy.
    InvalidScope(String),
    /// The operation was refused because the target window is config-disabled.
    Disabled(WindowId),
    /// A window-runtime adapter call failed (the OS window vanished, etc).
    RuntimeFailure(String),
    /// The requested transition is not legal from the current state (e.g.
    /// tabbing a window that is already tabbed elsewhere).
    InvalidState(String),
    /// A runtime command did not complete within the configured timeout.
    Timeout(WindowId),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::InvalidScope(msg) => write!(f, "invalid scope: {msg}"),
            Self::Disabled(id) => write!(f, "window {id} is disabled"),
            Self::RuntimeFailure(msg) => write!(f, "runtime failure: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Timeout(id) => write!(f, "timed out waiting on window {id}"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl LayoutError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RuntimeFailure(_) | Self::Timeout(_))
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
