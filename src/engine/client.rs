//! The client API surface: requests, responses, and pushed events, modeled
//! as plain enums consumed by the engine's query/command channel rather than
//! any particular RPC transport (see `DESIGN.md`).

use crate::engine::save_restore::SavedTabGroup;
use crate::engine::tab_group::TabStripLayout;
use crate::engine::window::{SnapGroupId, TabGroupId, WindowId};
use crate::error::LayoutError;

/// A snapshot of one tab group's membership, as returned by `getTabs`.
#[derive(Clone, Debug, PartialEq)]
pub struct TabGroupSummary {
    pub id: TabGroupId,
    pub tab_strip: WindowId,
    pub tabs: Vec<WindowId>,
    pub active_tab: WindowId,
}

/// A request from a client, addressed by [`WindowId`] or group id.
#[derive(Debug)]
pub enum ClientRequest {
    Undock(WindowId),
    ExplodeGroup(SnapGroupId),
    GetTabs,
    /// `ids[0]` is the tab-strip window; the rest are the initial tabs, with
    /// the first tab becoming active (ADDED — `createTabGroup(ids[])`'s
    /// active-tab choice is not specified upstream; see `DESIGN.md`).
    CreateTabGroup { ids: Vec<WindowId>, layout: TabStripLayout },
    AddTab { group: TabGroupId, window: WindowId },
    RemoveTab(WindowId),
    SwitchTab { group: TabGroupId, window: WindowId },
    SetActiveTab(WindowId),
    GetSaveInfo,
    Restore(Vec<SavedTabGroup>),
}

/// The response to a [`ClientRequest`].
#[derive(Debug)]
pub enum ClientResponse {
    Ok,
    Tabs(Vec<TabGroupSummary>),
    TabGroupCreated(TabGroupId),
    SaveInfo(Vec<SavedTabGroup>),
    Restored(Vec<TabGroupId>),
    Error(LayoutError),
}

/// An event pushed to clients as group membership or activation changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    JoinSnapGroup { group: SnapGroupId, window: WindowId },
    LeaveSnapGroup { group: SnapGroupId, window: WindowId },
    JoinTabGroup { group: TabGroupId, window: WindowId },
    LeaveTabGroup { group: TabGroupId, window: WindowId },
    TabActivated { group: TabGroupId, window: WindowId },
}

impl ClientEvent {
    /// Projects an internal [`crate::engine::signals::EngineEvent`] onto the
    /// subset that is client-visible, dropping private `WindowMessage`
    /// signals and destroyed-group bookkeeping the client API never reports.
    #[must_use]
    pub fn from_engine_event(event: &crate::engine::signals::EngineEvent) -> Option<Self> {
        use crate::engine::signals::EngineEvent as E;
        match event {
            E::JoinSnapGroup { group, window } => {
                Some(Self::JoinSnapGroup { group: *group, window: window.clone() })
            }
            E::LeaveSnapGroup { group, window } => {
                Some(Self::LeaveSnapGroup { group: *group, window: window.clone() })
            }
            E::JoinTabGroup { group, window } => {
                Some(Self::JoinTabGroup { group: *group, window: window.clone() })
            }
            E::LeaveTabGroup { group, window } => {
                Some(Self::LeaveTabGroup { group: *group, window: window.clone() })
            }
            E::TabActivated { group, window } => {
                Some(Self::TabActivated { group: *group, window: window.clone() })
            }
            E::WindowMessage { .. } | E::SnapGroupDestroyed { .. } | E::TabGroupDestroyed { .. } => None,
        }
    }
}
