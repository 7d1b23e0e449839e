//! Desktop Model: the registry of all managed windows, snap groups, and tab
//! groups. Enforces referential invariants — no two managed windows share
//! an id, every group referenced by a window also exists in the registry,
//! and orphaned groups are collected on the same turn as the removal that
//! produced them.
//!
//! All mutation happens here rather than on [`SnapGroup`]/[`TabGroup`]
//! directly: a window belongs to a group and a group holds a list of
//! windows, but cross-references are ids, never owning references, so
//! membership changes always go through the owner of both sides.

use std::collections::HashMap;

use crate::engine::entity::Entity;
use crate::engine::geometry::{Direction, Rect};
use crate::engine::signals::{EngineEvent, EventBatch, WindowMessage};
use crate::engine::snap_group::SnapGroup;
use crate::engine::tab_group::{TabGroup, TabStripLayout};
use crate::engine::window::{ManagedWindow, SnapGroupId, StateDelta, TabGroupId, WindowId, WindowState};
use crate::error::{LayoutError, LayoutResult};

#[derive(Debug, Default)]
pub struct DesktopModel {
    windows: HashMap<WindowId, ManagedWindow>,
    snap_groups: HashMap<SnapGroupId, SnapGroup>,
    tab_groups: HashMap<TabGroupId, TabGroup>,
    /// Per-tab rect captured at `addTab` time, restored when a tab leaves.
    pre_tab_rects: HashMap<WindowId, Rect>,
    next_snap_group_id: SnapGroupId,
    next_tab_group_id: TabGroupId,
}

impl DesktopModel {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // ------------------------------------------------------------------
    // Registry access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get_window(&self, id: &WindowId) -> Option<&ManagedWindow> { self.windows.get(id) }

    #[must_use]
    pub fn get_window_mut(&mut self, id: &WindowId) -> Option<&mut ManagedWindow> {
        self.windows.get_mut(id)
    }

    #[must_use]
    pub fn get_snap_group(&self, id: SnapGroupId) -> Option<&SnapGroup> { self.snap_groups.get(&id) }

    #[must_use]
    pub fn get_snap_group_mut(&mut self, id: SnapGroupId) -> Option<&mut SnapGroup> {
        self.snap_groups.get_mut(&id)
    }

    pub fn snap_groups(&self) -> impl Iterator<Item = &SnapGroup> { self.snap_groups.values() }

    #[must_use]
    pub fn get_tab_group(&self, id: TabGroupId) -> Option<&TabGroup> { self.tab_groups.get(&id) }

    pub fn tab_groups(&self) -> impl Iterator<Item = &TabGroup> { self.tab_groups.values() }

    /// The absolute bounding rect of a snap group, recomputing the cache if
    /// stale. Returns `None` if the group does not exist.
    pub fn snap_group_rect(&mut self, id: SnapGroupId) -> Option<Rect> {
        let mut group = self.snap_groups.remove(&id)?;
        let rect = group.absolute_rect(self);
        self.snap_groups.insert(id, group);
        Some(rect)
    }

    /// Every registered window id, for operations that need to walk the
    /// whole registry (e.g. re-applying configuration after a manifest
    /// change).
    #[must_use]
    pub fn for_each_window_id(&self) -> Vec<WindowId> { self.windows.keys().cloned().collect() }

    /// Every entity on the desktop: each tab group once, and each window
    /// not in a multi-tab tab group standalone.
    pub fn for_each_entity(&self, mut f: impl FnMut(Entity)) {
        let mut tabbed = std::collections::HashSet::new();
        for tg in self.tab_groups.values() {
            if tg.tabs.len() >= 2 {
                for tab in &tg.tabs {
                    tabbed.insert(tab.clone());
                }
                f(Entity::TabGroup(tg.id));
            }
        }
        for id in self.windows.keys() {
            if !tabbed.contains(id) {
                f(Entity::Window(id.clone()));
            }
        }
    }

    // ------------------------------------------------------------------
    // Window lifecycle
    // ------------------------------------------------------------------

    /// Registers a new managed window and places it in a fresh singleton
    /// snap group (invariant 1: every window belongs to exactly one group).
    pub fn create_window(&mut self, id: WindowId, state: WindowState) -> SnapGroupId {
        let group_id = self.next_snap_group_id;
        self.next_snap_group_id += 1;
        self.snap_groups.insert(group_id, SnapGroup::new(group_id, id.clone()));
        self.windows.insert(id.clone(), ManagedWindow::new(id, state, group_id));
        group_id
    }

    /// Applies a state delta, marking the owning snap group's bounds stale.
    /// Returns whether the delta flips group-eligibility (the engine's
    /// `onModified` trigger).
    pub fn apply_window_delta(&mut self, id: &WindowId, delta: &StateDelta) -> bool {
        let Some(window) = self.windows.get_mut(id) else { return false };
        let modifying = window.state.delta_is_modifying(delta);
        window.state.apply(delta);
        let group_id = window.snap_group;
        if let Some(group) = self.snap_groups.get_mut(&group_id) {
            group.mark_stale();
        }
        modifying
    }

    /// Tears down a window: removes it from any tab group, then from its
    /// snap group, destroying a group that becomes empty.
    pub fn remove_window(&mut self, id: &WindowId) -> EventBatch {
        let mut events = Vec::new();
        let Some(window) = self.windows.get(id).cloned() else { return events };

        if let Some(tg) = window.tab_group {
            events.extend(self.remove_tab(tg, id));
        }

        events.extend(self.detach_from_snap_group(id));
        self.windows.remove(id);
        events
    }

    /// Moves `id` into `target_group_id`: detaches it from its current snap
    /// group (destroying that group if it becomes empty), appends it to the
    /// target, and messages the window if the target is now size ≥ 2.
    pub fn move_window_to_snap_group(&mut self, id: &WindowId, target_group_id: SnapGroupId) -> EventBatch {
        let mut events = Vec::new();
        let Some(current) = self.windows.get(id).map(|w| w.snap_group) else { return events };
        if current == target_group_id {
            return events;
        }

        events.extend(self.detach_from_snap_group(id));

        if let Some(group) = self.snap_groups.get_mut(&target_group_id) {
            group.windows.push(id.clone());
            group.mark_stale();
        }
        if let Some(window) = self.windows.get_mut(id) {
            window.snap_group = target_group_id;
        }
        if let Some(group) = self.snap_groups.get_mut(&target_group_id) {
            group.recompute_root(self);
        }

        if let Some(group) = self.snap_groups.get(&target_group_id) {
            if group.is_grouped() {
                events.push(EngineEvent::WindowMessage {
                    window: id.clone(),
                    message: WindowMessage::JoinSnapGroup,
                });
                events.push(EngineEvent::JoinSnapGroup { group: target_group_id, window: id.clone() });
            }
        }
        events
    }

    /// Removes `id` from its current snap group without placing it
    /// anywhere else; callers must immediately assign a new group.
    fn detach_from_snap_group(&mut self, id: &WindowId) -> EventBatch {
        let mut events = Vec::new();
        let Some(group_id) = self.windows.get(id).map(|w| w.snap_group) else { return events };
        let Some(group) = self.snap_groups.get_mut(&group_id) else { return events };

        group.windows.retain(|w| w != id);
        let now_empty = group.windows.is_empty();
        let still_grouped = group.is_grouped();

        if !now_empty {
            if still_grouped {
                // Collapsed to exactly 1 is "ungrouped" to the client API,
                // so neither the window message nor the client event fires.
                events.push(EngineEvent::WindowMessage {
                    window: id.clone(),
                    message: WindowMessage::LeaveSnapGroup,
                });
                events.push(EngineEvent::LeaveSnapGroup { group: group_id, window: id.clone() });
            }
            self.snap_groups.get_mut(&group_id).unwrap().recompute_root(self);
        } else {
            self.snap_groups.remove(&group_id);
            events.push(EngineEvent::SnapGroupDestroyed { group: group_id });
        }
        events
    }

    /// Splits a window back into its own singleton snap group — used when
    /// the engine re-validates a modified member (§4.8) and by the client
    /// `explodeGroup` request.
    pub fn isolate_in_new_snap_group(&mut self, id: &WindowId) -> LayoutResult<EventBatch> {
        if !self.windows.contains_key(id) {
            return Err(LayoutError::NotFound(id.to_string()));
        }
        let new_id = self.next_snap_group_id;
        self.next_snap_group_id += 1;
        self.snap_groups.insert(new_id, SnapGroup::new(new_id, id.clone()));
        // `new` already seeded `windows: [id]`; move_window_to_snap_group
        // would double-insert, so detach then splice manually.
        let group = self.snap_groups.get_mut(&new_id).unwrap();
        group.windows.clear();
        drop(group);
        Ok(self.move_window_to_snap_group(id, new_id))
    }

    /// Splits every member of `group_id` into its own singleton group
    /// (client API `explodeGroup`).
    pub fn explode_snap_group(&mut self, group_id: SnapGroupId) -> LayoutResult<EventBatch> {
        let Some(group) = self.snap_groups.get(&group_id) else {
            return Err(LayoutError::NotFound(format!("snap group {group_id}")));
        };
        let members = group.windows.clone();
        let mut events = Vec::new();
        for member in members {
            events.extend(self.isolate_in_new_snap_group(&member)?);
        }
        Ok(events)
    }

    /// Enforces invariant 5: a config-disabled window is always a
    /// singleton and in no tab group. Re-enabling does not auto-rejoin
    /// anything; the user must drag.
    pub fn set_window_enabled(&mut self, id: &WindowId, enabled: bool) -> LayoutResult<EventBatch> {
        let Some(window) = self.windows.get(id) else {
            return Err(LayoutError::NotFound(id.to_string()));
        };
        if window.enabled == enabled {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        if let Some(w) = self.windows.get_mut(id) {
            w.enabled = enabled;
        }
        if !enabled {
            if let Some(tg) = self.windows.get(id).and_then(|w| w.tab_group) {
                events.extend(self.remove_tab(tg, id));
            }
            events.extend(self.isolate_in_new_snap_group(id)?);
        }
        Ok(events)
    }

    /// Detects a snap group whose members are no longer edge-adjacent — a
    /// runtime move can relocate one member without routing back through
    /// `move_window_to_snap_group` — and splits it into one group per
    /// connected component of the snap-adjacency graph. The source leaves
    /// this case underspecified (§9, open question b); we resolve it by
    /// connectivity rather than leaving disjoint windows sharing a group.
    pub fn revalidate_connectivity(&mut self, group_id: SnapGroupId) -> EventBatch {
        let mut events = Vec::new();
        let Some(group) = self.snap_groups.get(&group_id) else { return events };
        if group.windows.len() < 2 {
            return events;
        }
        let members = group.windows.clone();
        let rects: Vec<Rect> =
            members.iter().map(|id| self.windows.get(id).map(|w| w.state.rect).unwrap_or_default()).collect();

        let mut parent: Vec<usize> = (0..members.len()).collect();
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                if edge_adjacent(&rects[i], &rects[j]) {
                    let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
                    if ri != rj {
                        parent[ri] = rj;
                    }
                }
            }
        }

        let mut components: HashMap<usize, Vec<WindowId>> = HashMap::new();
        for (i, member) in members.iter().enumerate() {
            let root = find_root(&mut parent, i);
            components.entry(root).or_default().push(member.clone());
        }
        if components.len() <= 1 {
            return events;
        }

        // Leave the largest component where it is; every other component
        // gets split off into its own fresh snap group.
        let mut comps: Vec<Vec<WindowId>> = components.into_values().collect();
        comps.sort_by_key(|c| std::cmp::Reverse(c.len()));
        for comp in comps.into_iter().skip(1) {
            let Some((first, rest)) = comp.split_first() else { continue };
            events.extend(self.isolate_in_new_snap_group(first).unwrap_or_default());
            let Some(new_group) = self.windows.get(first).map(|w| w.snap_group) else { continue };
            for member in rest {
                events.extend(self.move_window_to_snap_group(member, new_group));
            }
        }
        events
    }

    // ------------------------------------------------------------------
    // Tab group lifecycle
    // ------------------------------------------------------------------

    /// Creates a tab group from an already-registered tab strip window and
    /// an initial set of tabs, all of which must be untabbed elsewhere.
    pub fn create_tab_group(
        &mut self,
        tab_strip: WindowId,
        tabs: Vec<WindowId>,
        active: WindowId,
        layout: TabStripLayout,
    ) -> LayoutResult<(TabGroupId, EventBatch)> {
        if !self.windows.contains_key(&tab_strip) {
            return Err(LayoutError::NotFound(tab_strip.to_string()));
        }
        if tabs.len() < 2 {
            return Err(LayoutError::InvalidState("a tab group needs at least 2 tabs".to_string()));
        }
        for t in &tabs {
            let Some(w) = self.windows.get(t) else {
                return Err(LayoutError::NotFound(t.to_string()));
            };
            if w.tab_group.is_some() {
                return Err(LayoutError::InvalidState(format!("{t} is already tabbed")));
            }
        }
        if !tabs.contains(&active) {
            return Err(LayoutError::InvalidState(format!("{active} is not among the tabs")));
        }

        let id = self.next_tab_group_id;
        self.next_tab_group_id += 1;
        let target_group = self.windows.get(&tab_strip).map(|w| w.snap_group).unwrap();

        self.tab_groups.insert(id, TabGroup::new(id, tab_strip.clone(), Vec::new(), active.clone(), layout, target_group));

        let mut events = Vec::new();
        for tab in &tabs {
            events.extend(self.add_tab_unchecked(id, tab.clone(), None));
        }
        events.extend(self.switch_tab(id, &active).unwrap_or_default());
        Ok((id, events))
    }

    /// Adds a tab to an existing group. A window already in the group is a
    /// no-op (idempotent per §8, property 10).
    pub fn add_tab(&mut self, group_id: TabGroupId, window: WindowId, index: Option<usize>) -> LayoutResult<EventBatch> {
        if !self.tab_groups.contains_key(&group_id) {
            return Err(LayoutError::NotFound(format!("tab group {group_id}")));
        }
        let Some(w) = self.windows.get(&window) else {
            return Err(LayoutError::NotFound(window.to_string()));
        };
        if let Some(existing) = w.tab_group {
            if existing == group_id {
                return Ok(Vec::new());
            }
            return Err(LayoutError::InvalidState(format!("{window} is already tabbed")));
        }
        Ok(self.add_tab_unchecked(group_id, window, index))
    }

    fn add_tab_unchecked(&mut self, group_id: TabGroupId, window: WindowId, index: Option<usize>) -> EventBatch {
        let mut events = Vec::new();
        let Some(group) = self.tab_groups.get(&group_id) else { return events };
        let target_snap_group = group.snap_group;
        let body = group.rect(self);

        if let Some(w) = self.windows.get(&window) {
            self.pre_tab_rects.insert(window.clone(), w.state.rect);
        }

        events.extend(self.move_window_to_snap_group(&window, target_snap_group));

        let is_active = self.tab_groups.get(&group_id).is_some_and(|g| g.active_tab == window || g.tabs.is_empty());
        if let Some(w) = self.windows.get_mut(&window) {
            w.tab_group = Some(group_id);
            w.state.rect = body;
            w.state.hidden = !is_active;
        }

        let group = self.tab_groups.get_mut(&group_id).unwrap();
        match index {
            Some(i) if i <= group.tabs.len() => group.tabs.insert(i, window.clone()),
            _ => group.tabs.push(window.clone()),
        }
        if group.tabs.len() == 1 {
            group.active_tab = window.clone();
        }

        events.push(EngineEvent::JoinTabGroup { group: group_id, window });
        events
    }

    /// Removes a tab from its group. Selects the next-in-order tab as
    /// active if the removed tab was active; self-destructs the group
    /// (restoring the survivor's pre-tab bounds) if fewer than 2 tabs
    /// would remain.
    pub fn remove_tab(&mut self, group_id: TabGroupId, window: &WindowId) -> EventBatch {
        let mut events = Vec::new();
        let Some(group) = self.tab_groups.get(&group_id) else { return events };
        if !group.contains(window) {
            return events;
        }
        let was_active = group.active_tab == *window;
        let next_active = group.next_active_after_removing(window);

        if let Some(w) = self.windows.get_mut(window) {
            w.tab_group = None;
        }
        if let Some(rect) = self.pre_tab_rects.remove(window) {
            if let Some(w) = self.windows.get_mut(window) {
                w.state.rect = rect;
                w.state.hidden = false;
            }
        }
        events.push(EngineEvent::LeaveTabGroup { group: group_id, window: window.clone() });

        let group = self.tab_groups.get_mut(&group_id).unwrap();
        group.tabs.retain(|w| w != window);

        if group.should_self_destruct() {
            let survivor = group.tabs.first().cloned();
            let tab_strip = group.tab_strip.clone();
            self.tab_groups.remove(&group_id);
            events.push(EngineEvent::TabGroupDestroyed { group: group_id });

            if let Some(survivor) = survivor {
                if let Some(rect) = self.pre_tab_rects.remove(&survivor) {
                    if let Some(w) = self.windows.get_mut(&survivor) {
                        w.state.rect = rect;
                        w.state.hidden = false;
                    }
                }
                if let Some(w) = self.windows.get_mut(&survivor) {
                    w.tab_group = None;
                }
            }
            events.extend(self.remove_window(&tab_strip));
            return events;
        }

        if was_active {
            if let Some(new_active) = next_active {
                events.extend(self.switch_tab(group_id, &new_active).unwrap_or_default());
            }
        }
        events
    }

    /// Switches the active tab. A repeat call with the same target is a
    /// no-op (idempotent per §8, property 9).
    pub fn switch_tab(&mut self, group_id: TabGroupId, window: &WindowId) -> LayoutResult<EventBatch> {
        let Some(group) = self.tab_groups.get(&group_id) else {
            return Err(LayoutError::NotFound(format!("tab group {group_id}")));
        };
        if !group.contains(window) {
            return Err(LayoutError::NotFound(window.to_string()));
        }
        if group.active_tab == *window {
            return Ok(Vec::new());
        }
        let previous = group.active_tab.clone();
        let body = group.rect(self);

        if let Some(w) = self.windows.get_mut(&previous) {
            w.state.hidden = true;
        }
        if let Some(w) = self.windows.get_mut(window) {
            w.state.hidden = false;
            w.state.rect = body;
        }
        self.tab_groups.get_mut(&group_id).unwrap().active_tab = window.clone();

        Ok(vec![EngineEvent::TabActivated { group: group_id, window: window.clone() }])
    }

    /// Repositions every tab (shown or hidden) to match the strip's
    /// current body region.
    pub fn realign_tabs(&mut self, group_id: TabGroupId) {
        let Some(group) = self.tab_groups.get(&group_id) else { return };
        let body = group.rect(self);
        let tabs = group.tabs.clone();
        for tab in tabs {
            if let Some(w) = self.windows.get_mut(&tab) {
                w.state.rect = body;
            }
        }
    }

    /// Tears the whole group down. When `close_apps` is set every tab
    /// (and the strip) is removed from the registry outright; otherwise
    /// tabs are detached and restored to their pre-tab bounds.
    pub fn close_tab_group(&mut self, group_id: TabGroupId, close_apps: bool) -> LayoutResult<EventBatch> {
        let Some(group) = self.tab_groups.get(&group_id).cloned() else {
            return Err(LayoutError::NotFound(format!("tab group {group_id}")));
        };
        let mut events = Vec::new();
        if close_apps {
            for tab in &group.tabs {
                events.extend(self.remove_window(tab));
            }
            events.extend(self.remove_window(&group.tab_strip));
            self.tab_groups.remove(&group_id);
        } else {
            for tab in group.tabs.clone() {
                events.extend(self.remove_tab(group_id, &tab));
            }
        }
        Ok(events)
    }
}

/// Union-find root lookup with path compression, for snap-adjacency
/// connectivity components.
fn find_root(parent: &mut [usize], x: usize) -> usize {
    if parent[x] != x {
        parent[x] = find_root(parent, parent[x]);
    }
    parent[x]
}

/// Two rects are snap-adjacent if they touch (within a pixel of tolerance)
/// along a shared edge with any positive overlap on the parallel axis.
fn edge_adjacent(a: &Rect, b: &Rect) -> bool {
    const TOLERANCE: f64 = 0.5;
    for direction in [Direction::Left, Direction::Right, Direction::Top, Direction::Bottom] {
        let (delta, overlap) = a.edge_gap(b, direction);
        if delta.abs() <= TOLERANCE && overlap > 0.0 {
            return true;
        }
    }
    false
}
