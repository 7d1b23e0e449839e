//! Engine-mediated event dispatch.
//!
//! The source this crate is modeled on wires components with typed
//! publish/subscribe ("signals"): a snap group fires `onWindowAdded`, a
//! window fires `onTransform`, and so on. Rust makes per-component observer
//! sets awkward when the subject and the observer both need mutable access
//! to the same model, so instead each mutating model call *returns* the
//! signals it produced and the [`crate::engine::actor::LayoutEngine`] fans
//! them out — option (b) from `DESIGN.md`, "Signals and back-references".
//! Groups and windows never hold a callback or a back-pointer to the engine.

use crate::engine::window::{SnapGroupId, TabGroupId, WindowId};

/// A control message a [`crate::engine::window::ManagedWindow`] receives
/// from its snap or tab group (`sendMessage` in the source).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowMessage {
    JoinSnapGroup,
    LeaveSnapGroup,
    JoinTabGroup { group: TabGroupId },
    LeaveTabGroup { group: TabGroupId },
}

/// One outcome of a model mutation, queued for the engine to dispatch.
///
/// `WindowMessage` variants are private wire-level signals delivered to a
/// single window's handle; the other variants double as the payload for
/// the client-facing events in §6 (`join-snap-group`, `tab-activated`, …).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    WindowMessage { window: WindowId, message: WindowMessage },
    JoinSnapGroup { group: SnapGroupId, window: WindowId },
    LeaveSnapGroup { group: SnapGroupId, window: WindowId },
    SnapGroupDestroyed { group: SnapGroupId },
    JoinTabGroup { group: TabGroupId, window: WindowId },
    LeaveTabGroup { group: TabGroupId, window: WindowId },
    TabGroupDestroyed { group: TabGroupId },
    TabActivated { group: TabGroupId, window: WindowId },
}

/// An ordered batch of signals produced by a single model mutation.
pub type EventBatch = Vec<EngineEvent>;
