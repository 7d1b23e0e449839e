//! Window identity, cached state, and the managed-window model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::geometry::Rect;

/// Globally unique identity of an OS window, while it exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId {
    pub uuid: String,
    pub name: String,
}

impl WindowId {
    #[must_use]
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self { uuid: uuid.into(), name: name.into() }
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.uuid, self.name)
    }
}

/// Run state of a window, as reported by the runtime adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Normal,
    Minimized,
    Maximized,
}

/// Bitmask over the kinds of transform an `onTransform` event can carry.
/// Move events fire at up to ~30 Hz while a window is being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TransformKind(u8);

impl TransformKind {
    pub const MOVE: Self = Self(0b01);
    pub const RESIZE: Self = Self(0b10);

    #[must_use]
    pub const fn empty() -> Self { Self(0) }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }
}

impl std::ops::BitOr for TransformKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

/// Cached window state, refreshed on every observed transform and commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    pub rect: Rect,
    pub frame: bool,
    pub hidden: bool,
    pub state: RunState,
    pub min_size: crate::engine::geometry::Point,
    pub max_size: crate::engine::geometry::Point,
    pub opacity: f64,
}

impl WindowState {
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            frame: true,
            hidden: false,
            state: RunState::Normal,
            min_size: crate::engine::geometry::Point::zero(),
            max_size: crate::engine::geometry::Point::zero(),
            opacity: 1.0,
        }
    }

    /// Visible + normal-state: the predicate snap-group bounding boxes use
    /// to decide whether a member contributes to the aggregate bounds.
    #[must_use]
    pub const fn counts_toward_bounds(&self) -> bool {
        !self.hidden && matches!(self.state, RunState::Normal)
    }
}

/// A partial update applied to a window's cached state.
#[derive(Clone, Debug, Default)]
pub struct StateDelta {
    pub rect: Option<Rect>,
    pub frame: Option<bool>,
    pub hidden: Option<bool>,
    pub state: Option<RunState>,
    pub opacity: Option<f64>,
}

impl WindowState {
    pub fn apply(&mut self, delta: &StateDelta) {
        if let Some(rect) = delta.rect {
            self.rect = rect;
        }
        if let Some(frame) = delta.frame {
            self.frame = frame;
        }
        if let Some(hidden) = delta.hidden {
            self.hidden = hidden;
        }
        if let Some(state) = delta.state {
            self.state = state;
        }
        if let Some(opacity) = delta.opacity {
            self.opacity = opacity;
        }
    }

    /// Whether this delta, if applied, would change group eligibility
    /// (frame, minimized/maximized, hidden) — the engine's `onModified` trigger.
    #[must_use]
    pub fn delta_is_modifying(&self, delta: &StateDelta) -> bool {
        (delta.frame.is_some_and(|v| v != self.frame))
            || (delta.hidden.is_some_and(|v| v != self.hidden))
            || (delta.state.is_some_and(|v| v != self.state))
    }
}

pub type SnapGroupId = u64;
pub type TabGroupId = u64;

/// The engine's model of one OS window.
#[derive(Clone, Debug)]
pub struct ManagedWindow {
    pub id: WindowId,
    pub state: WindowState,
    pub snap_group: SnapGroupId,
    pub tab_group: Option<TabGroupId>,
    pub prev_snap_group: Option<SnapGroupId>,
    pub ready: bool,
    pub enabled: bool,
}

impl ManagedWindow {
    #[must_use]
    pub fn new(id: WindowId, state: WindowState, snap_group: SnapGroupId) -> Self {
        Self {
            id,
            state,
            snap_group,
            tab_group: None,
            prev_snap_group: None,
            ready: true,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn is_tabbed(&self) -> bool { self.tab_group.is_some() }
}
