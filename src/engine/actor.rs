//! The layout engine's actor: owns the desktop model and the configuration
//! store, and processes every mutation on one logical queue.
//!
//! Modeled on this codebase family's state-actor pattern: a single task owns
//! an `mpsc::Receiver`, `EngineHandle` is the cheap, cloneable sender side,
//! and every message is handled inside a `catch_unwind` boundary so one bad
//! event can't take the whole loop down.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::engine::adapter::WindowRuntimeAdapter;
use crate::engine::client::{ClientEvent, ClientRequest, ClientResponse, TabGroupSummary};
use crate::engine::config::mask::ConfigMask;
use crate::engine::config::object::ConfigurationObject;
use crate::engine::config::rule::Rule;
use crate::engine::config::scope::Scope;
use crate::engine::config::store::ConfigurationStore;
use crate::engine::entity::Entity;
use crate::engine::geometry::{Point, Rect};
use crate::engine::model::DesktopModel;
use crate::engine::save_restore;
use crate::engine::signals::EventBatch;
use crate::engine::snap_resolver::{self, SnapResolverConfig, SnapTarget, Validity};
use crate::engine::tab_resolver::{self, ZOrderIndex};
use crate::engine::window::{SnapGroupId, StateDelta, TabGroupId, TransformKind, WindowId, WindowState};
use crate::error::{LayoutError, LayoutResult};

/// Buffer size for the engine's inbound message channel.
const CHANNEL_BUFFER_SIZE: usize = 512;

/// Buffer size for the client-event broadcast channel. Lagging subscribers
/// drop the oldest events rather than stall the engine.
const EVENT_BUFFER_SIZE: usize = 256;

/// Errors from communicating with a running [`LayoutEngine`] over its
/// message channel. Kept narrow and `thiserror`-derived, unlike the broader
/// hand-rolled [`crate::error::LayoutError`] the rest of the crate uses —
/// this is the one boundary this codebase family reaches for `thiserror` on.
#[derive(Debug, thiserror::Error)]
pub enum EngineHandleError {
    #[error("failed to send message to layout engine: channel closed")]
    SendFailed,
    #[error("failed to receive response from layout engine: channel closed")]
    ReceiveFailed,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Messages dispatched into the engine's run loop: runtime-adapter events,
/// client requests, and control.
#[derive(Debug)]
pub enum EngineMessage {
    WindowCreated { id: WindowId, state: WindowState },
    WindowDestroyed { id: WindowId },
    WindowFocused { id: WindowId },
    /// An originated move/resize transform, mid-drag.
    WindowTransform { id: WindowId, rect: Rect, kind: TransformKind, cursor: Point },
    /// The originating window's drag ended (mouse release).
    WindowCommit { id: WindowId },
    /// A group-eligibility-affecting change: frame, hidden, or run-state.
    WindowModified { id: WindowId, delta: StateDelta },
    /// The configuration store changed; apply `update`, then re-derive
    /// `enabled` for every window.
    ConfigChanged(ConfigUpdate),
    ClientRequest { request: ClientRequest, respond_to: oneshot::Sender<ClientResponse> },
    Shutdown,
}

/// A manifest-driven mutation of the engine's [`ConfigurationStore`],
/// mirroring the `add`/`removeFromSource` pair the on-disk manifest loader
/// and its hot-reload watcher drive the store with (see `DESIGN.md`).
#[derive(Debug)]
pub enum ConfigUpdate {
    Add { source: Scope, config: ConfigurationObject, rules: Vec<Rule> },
    RemoveSource(Scope),
}

/// A cheap, cloneable handle to a running [`LayoutEngine`].
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineMessage>,
}

impl EngineHandle {
    /// Non-blocking send; queues the message if the engine is busy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineHandleError::SendFailed`] if the engine has stopped.
    pub fn send(&self, msg: EngineMessage) -> Result<(), EngineHandleError> {
        self.sender.try_send(msg).map_err(|_| EngineHandleError::SendFailed)
    }

    /// Sends a message, waiting if the channel buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`EngineHandleError::SendFailed`] if the engine has stopped.
    pub async fn send_async(&self, msg: EngineMessage) -> Result<(), EngineHandleError> {
        self.sender.send(msg).await.map_err(|_| EngineHandleError::SendFailed)
    }

    /// Issues a client request and awaits its response.
    ///
    /// # Errors
    ///
    /// Returns [`EngineHandleError::SendFailed`] or
    /// [`EngineHandleError::ReceiveFailed`] if the channel closes.
    pub async fn query(&self, request: ClientRequest) -> Result<ClientResponse, EngineHandleError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(EngineMessage::ClientRequest { request, respond_to: tx })
            .await
            .map_err(|_| EngineHandleError::SendFailed)?;
        rx.await.map_err(|_| EngineHandleError::ReceiveFailed)
    }

    /// As [`Self::query`], but bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineHandleError::Timeout`] if `timeout` elapses first.
    pub async fn query_timeout(
        &self,
        request: ClientRequest,
        timeout: Duration,
    ) -> Result<ClientResponse, EngineHandleError> {
        tokio::time::timeout(timeout, self.query(request)).await.map_err(|_| EngineHandleError::Timeout(timeout))?
    }

    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }
}

/// A pending preview, resolved each time a debounced burst of transforms for
/// its drag is flushed. Tab targets take priority over snap targets at
/// commit time per §4.5.
#[derive(Clone, Debug)]
enum Preview {
    Tab(TabGroupId),
    Snap(SnapTarget),
}

#[derive(Default)]
struct DragState {
    /// The window currently being dragged, and the last cursor position
    /// observed for it.
    active: Option<(WindowId, Point)>,
    preview: Option<Preview>,
}

/// The top-level orchestrator. Owns the desktop model, the configuration
/// store, the z-order index the tab resolver needs, and the runtime adapter.
pub struct LayoutEngine {
    model: DesktopModel,
    config: ConfigurationStore,
    adapter: Box<dyn WindowRuntimeAdapter>,
    z_order: ZOrderIndex,
    drag: DragState,
    /// Per-window transform slot a new `WindowTransform` overwrites before
    /// the loop next drains it — the coalescing realization of §5.
    pending_transforms: HashMap<WindowId, (Rect, TransformKind, Point)>,
    receiver: mpsc::Receiver<EngineMessage>,
    events: broadcast::Sender<ClientEvent>,
}

impl LayoutEngine {
    /// Constructs an engine around `adapter`, without spawning it. Use
    /// [`Self::spawn`] to run it on its own task.
    #[must_use]
    pub fn new(adapter: Box<dyn WindowRuntimeAdapter>) -> (Self, mpsc::Sender<EngineMessage>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        let engine = Self {
            model: DesktopModel::new(),
            config: ConfigurationStore::new(),
            adapter,
            z_order: ZOrderIndex::new(),
            drag: DragState::default(),
            pending_transforms: HashMap::new(),
            receiver,
            events,
        };
        (engine, sender)
    }

    /// Spawns the engine's run loop on the current tokio runtime, returning
    /// a handle and a subscription to client-facing events.
    #[must_use]
    pub fn spawn(adapter: Box<dyn WindowRuntimeAdapter>) -> (EngineHandle, broadcast::Receiver<ClientEvent>) {
        let (engine, sender) = Self::new(adapter);
        let events = engine.events.subscribe();
        tokio::spawn(async move { engine.run().await });
        (EngineHandle { sender }, events)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> { self.events.subscribe() }

    /// Runs the message loop until a [`EngineMessage::Shutdown`] arrives or
    /// every handle is dropped.
    pub async fn run(mut self) {
        tracing::debug!("layout engine: message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if self.dispatch_catching_panics(msg) {
                tracing::debug!("layout engine: shutdown received");
                return;
            }

            // Drain whatever is already queued without awaiting, coalescing
            // same-window transform bursts into their latest slot before the
            // loop spends time resolving any of them.
            while let Ok(msg) = self.receiver.try_recv() {
                if self.dispatch_catching_panics(msg) {
                    return;
                }
            }

            self.flush_pending_transforms();
        }

        tracing::debug!("layout engine: channel closed, exiting");
    }

    fn dispatch_catching_panics(&mut self, msg: EngineMessage) -> bool {
        if matches!(msg, EngineMessage::Shutdown) {
            return true;
        }
        let result = catch_unwind(AssertUnwindSafe(|| self.handle_message(msg)));
        if let Err(panic) = result {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("layout engine: recovered from panic while handling a message: {message}");
        }
        false
    }

    fn handle_message(&mut self, msg: EngineMessage) {
        match msg {
            EngineMessage::WindowCreated { id, state } => self.on_window_created(id, state),
            EngineMessage::WindowDestroyed { id } => self.on_window_destroyed(&id),
            EngineMessage::WindowFocused { id } => self.z_order.record_focus(id),
            EngineMessage::WindowTransform { id, rect, kind, cursor } => {
                self.pending_transforms.insert(id, (rect, kind, cursor));
            }
            EngineMessage::WindowCommit { id } => self.on_commit(&id),
            EngineMessage::WindowModified { id, delta } => self.on_modified(&id, &delta),
            EngineMessage::ConfigChanged(update) => self.apply_config_update(update),
            EngineMessage::ClientRequest { request, respond_to } => {
                let response = self.handle_client_request(request);
                let _ = respond_to.send(response);
            }
            EngineMessage::Shutdown => unreachable!("handled before dispatch"),
        }
    }

    // ------------------------------------------------------------------
    // Window lifecycle
    // ------------------------------------------------------------------

    fn on_window_created(&mut self, id: WindowId, state: WindowState) {
        let group = self.model.create_window(id.clone(), state);
        tracing::debug!(%id, group, "window registered in a fresh singleton snap group");
        self.apply_config_to(&id);
    }

    fn on_window_destroyed(&mut self, id: &WindowId) {
        let events = self.model.remove_window(id);
        self.broadcast(&events);
        self.pending_transforms.remove(id);
        if self.drag.active.as_ref().is_some_and(|(active, _)| active == id) {
            self.drag = DragState::default();
        }
    }

    fn on_modified(&mut self, id: &WindowId, delta: &StateDelta) {
        if !self.model.apply_window_delta(id, delta) {
            return;
        }
        let Some(group_id) = self.model.get_window(id).map(|w| w.snap_group) else { return };
        if self.model.get_snap_group(group_id).is_some_and(crate::engine::snap_group::SnapGroup::is_grouped) {
            tracing::debug!(%id, "modified window leaves its snap group");
            if let Ok(events) = self.model.isolate_in_new_snap_group(id) {
                self.broadcast(&events);
            }
        }
    }

    // ------------------------------------------------------------------
    // Drag resolution
    // ------------------------------------------------------------------

    fn flush_pending_transforms(&mut self) {
        if self.pending_transforms.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_transforms);
        for (id, (rect, _kind, cursor)) in pending {
            self.resolve_drag(&id, rect, cursor);
        }
    }

    fn resolve_drag(&mut self, id: &WindowId, rect: Rect, cursor: Point) {
        self.model.apply_window_delta(id, &StateDelta { rect: Some(rect), ..StateDelta::default() });
        self.drag.active = Some((id.clone(), cursor));

        let Some(group_id) = self.model.get_window(id).map(|w| w.snap_group) else { return };

        let config = &self.config;
        let effective = config.query(&window_scope(id), &ConfigMask::all());
        let tab_enabled = effective.is_enabled() && effective.features.as_ref().and_then(|f| f.tab).unwrap_or(true);
        if tab_enabled {
            if let Some(tab_target) = tab_resolver::resolve(&self.model, cursor, id, &self.z_order) {
                self.drag.preview = Some(Preview::Tab(tab_target));
                return;
            }
        }

        let snap_enabled = |w: &WindowId| {
            let cfg = config.query(&window_scope(w), &ConfigMask::all());
            cfg.is_enabled() && cfg.features.and_then(|f| f.snap).unwrap_or(true)
        };
        let target = snap_resolver::resolve(&mut self.model, group_id, cursor, SnapResolverConfig::default(), &snap_enabled);
        self.drag.preview = target.map(Preview::Snap);
    }

    fn on_commit(&mut self, id: &WindowId) {
        self.flush_pending_transforms();
        let preview = self.drag.preview.take();
        self.drag.active = None;

        match preview {
            Some(Preview::Tab(group)) => {
                let index = self.model.get_tab_group(group).and_then(|g| g.index_of(&g.active_tab)).map(|i| i + 1);
                if let Ok(events) = self.model.add_tab(group, id.clone(), index) {
                    self.broadcast(&events);
                }
            }
            Some(Preview::Snap(target)) if target.validity == Validity::Valid => {
                self.commit_snap(id, &target);
            }
            _ => {}
        }

        if let Some(group_id) = self.model.get_window(id).map(|w| w.snap_group) {
            let events = self.model.revalidate_connectivity(group_id);
            self.broadcast(&events);
        }
    }

    fn commit_snap(&mut self, id: &WindowId, target: &SnapTarget) {
        let Some(moving_group) = self.model.get_window(id).map(|w| w.snap_group) else { return };
        let Entity::Window(_) | Entity::TabGroup(_) = target.active_entity else { return };

        let members: Vec<WindowId> =
            self.model.get_snap_group(moving_group).map(|g| g.windows.clone()).unwrap_or_default();

        for member in &members {
            let Some(rect) = self.model.get_window(member).map(|w| w.state.rect) else { continue };
            let translated = rect.translated(target.snap_offset);
            if let Err(err) = self.adapter.set_bounds(member, translated) {
                tracing::warn!(%member, %err, "runtime failed to translate window during snap commit; aborting");
                return;
            }
            self.model.apply_window_delta(member, &StateDelta { rect: Some(translated), ..StateDelta::default() });
        }

        if let Some(half_size) = target.half_size {
            if let Some(rect) = self.model.get_window(id).map(|w| w.state.rect) {
                let resized = Rect::new(rect.center, half_size);
                if self.adapter.resize_to(id, half_size).is_ok() {
                    self.model.apply_window_delta(id, &StateDelta { rect: Some(resized), ..StateDelta::default() });
                }
            }
        }

        for member in &members {
            if let Some(w) = self.model.get_window_mut(member) {
                w.prev_snap_group = Some(moving_group);
            }
        }
        let mut events = Vec::new();
        for member in &members {
            events.extend(self.model.move_window_to_snap_group(member, target.target_group));
        }
        self.broadcast(&events);
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    fn apply_config_update(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::Add { source, config, rules } => {
                if let Err(err) = self.config.add(source, config, rules) {
                    tracing::warn!(%err, "rejected configuration update");
                    return;
                }
            }
            ConfigUpdate::RemoveSource(source) => self.config.remove_from_source(&source),
        }
        self.apply_config_everywhere();
    }

    fn apply_config_everywhere(&mut self) {
        let ids: Vec<WindowId> = self.model.for_each_window_id();
        for id in ids {
            self.apply_config_to(&id);
        }
    }

    fn apply_config_to(&mut self, id: &WindowId) {
        let enabled =
            self.config.query(&window_scope(id), &ConfigMask::enabled_only()).enabled.unwrap_or(true);
        if let Ok(events) = self.model.set_window_enabled(id, enabled) {
            self.broadcast(&events);
        }
    }

    // ------------------------------------------------------------------
    // Client requests
    // ------------------------------------------------------------------

    fn handle_client_request(&mut self, request: ClientRequest) -> ClientResponse {
        match request {
            ClientRequest::Undock(id) => self.client_undock(&id),
            ClientRequest::ExplodeGroup(group) => {
                let result = self.model.explode_snap_group(group);
                self.wrap(result)
            }
            ClientRequest::GetTabs => ClientResponse::Tabs(self.client_get_tabs()),
            ClientRequest::CreateTabGroup { ids, layout } => self.client_create_tab_group(ids, layout),
            ClientRequest::AddTab { group, window } => {
                let result = self.model.add_tab(group, window, None);
                self.wrap(result)
            }
            ClientRequest::RemoveTab(window) => self.client_remove_tab(&window),
            ClientRequest::SwitchTab { group, window } => {
                let result = self.model.switch_tab(group, &window);
                self.wrap(result)
            }
            ClientRequest::SetActiveTab(window) => self.client_set_active_tab(&window),
            ClientRequest::GetSaveInfo => ClientResponse::SaveInfo(save_restore::save(&self.model)),
            ClientRequest::Restore(blobs) => self.client_restore(&blobs),
        }
    }

    fn wrap(&mut self, result: LayoutResult<EventBatch>) -> ClientResponse {
        match result {
            Ok(events) => {
                self.broadcast(&events);
                ClientResponse::Ok
            }
            Err(err) => ClientResponse::Error(err),
        }
    }

    fn client_undock(&mut self, id: &WindowId) -> ClientResponse {
        let Some(window) = self.model.get_window(id) else {
            return ClientResponse::Error(LayoutError::NotFound(id.to_string()));
        };
        let mut events = Vec::new();
        if let Some(tab_group) = window.tab_group {
            events.extend(self.model.remove_tab(tab_group, id));
        }
        match self.model.isolate_in_new_snap_group(id) {
            Ok(more) => {
                events.extend(more);
                self.broadcast(&events);
                ClientResponse::Ok
            }
            Err(err) => ClientResponse::Error(err),
        }
    }

    fn client_get_tabs(&self) -> Vec<TabGroupSummary> {
        self.model
            .tab_groups()
            .map(|g| TabGroupSummary {
                id: g.id,
                tab_strip: g.tab_strip.clone(),
                tabs: g.tabs.clone(),
                active_tab: g.active_tab.clone(),
            })
            .collect()
    }

    fn client_create_tab_group(
        &mut self,
        ids: Vec<WindowId>,
        layout: crate::engine::tab_group::TabStripLayout,
    ) -> ClientResponse {
        let Some((tab_strip, tabs)) = ids.split_first() else {
            return ClientResponse::Error(LayoutError::InvalidState("createTabGroup needs at least a strip and one tab".into()));
        };
        let Some(active) = tabs.first().cloned() else {
            return ClientResponse::Error(LayoutError::InvalidState("createTabGroup needs at least one tab".into()));
        };
        match self.model.create_tab_group(tab_strip.clone(), tabs.to_vec(), active, layout) {
            Ok((id, events)) => {
                self.broadcast(&events);
                ClientResponse::TabGroupCreated(id)
            }
            Err(err) => ClientResponse::Error(err),
        }
    }

    fn client_remove_tab(&mut self, window: &WindowId) -> ClientResponse {
        let Some(tab_group) = self.model.get_window(window).and_then(|w| w.tab_group) else {
            return ClientResponse::Error(LayoutError::NotFound(window.to_string()));
        };
        let events = self.model.remove_tab(tab_group, window);
        self.broadcast(&events);
        ClientResponse::Ok
    }

    fn client_set_active_tab(&mut self, window: &WindowId) -> ClientResponse {
        let Some(tab_group) = self.model.get_window(window).and_then(|w| w.tab_group) else {
            return ClientResponse::Error(LayoutError::NotFound(window.to_string()));
        };
        let result = self.model.switch_tab(tab_group, window);
        self.wrap(result)
    }

    fn client_restore(&mut self, blobs: &[save_restore::SavedTabGroup]) -> ClientResponse {
        match save_restore::restore(&mut self.model, blobs) {
            Ok((ids, events)) => {
                self.broadcast(&events);
                ClientResponse::Restored(ids)
            }
            Err(err) => ClientResponse::Error(err),
        }
    }

    fn broadcast(&self, events: &EventBatch) {
        for event in events {
            if let Some(client_event) = ClientEvent::from_engine_event(event) {
                let _ = self.events.send(client_event);
            }
        }
    }
}

/// The runtime scope a window's `WindowId` resolves to for config queries.
fn window_scope(id: &WindowId) -> Scope { Scope::Window { uuid: id.uuid.clone(), name: id.name.clone() } }
