//! Tab group: a set of windows sharing a tab-strip window.
//!
//! Membership mutation (`addTab`, `removeTab`, `switchTab`, `close`) lives on
//! [`crate::engine::model::DesktopModel`], since it touches other windows'
//! cached state and snap-group membership; this type holds the pure data and
//! the geometry the snap resolver needs.

use crate::engine::geometry::{Point, Rect};
use crate::engine::model::DesktopModel;
use crate::engine::window::{SnapGroupId, TabGroupId, WindowId};

/// Layout parameters for a tab strip, carried through save/restore.
#[derive(Clone, Debug, PartialEq)]
pub struct TabStripLayout {
    pub url: String,
    /// Height in pixels of the tab strip itself.
    pub tab_group_height: f64,
    /// Height in pixels of an individual tab body.
    pub app_height: f64,
}

impl Default for TabStripLayout {
    fn default() -> Self { Self { url: String::new(), tab_group_height: 36.0, app_height: 0.0 } }
}

#[derive(Clone, Debug)]
pub struct TabGroup {
    pub id: TabGroupId,
    pub tab_strip: WindowId,
    pub tabs: Vec<WindowId>,
    pub active_tab: WindowId,
    pub layout: TabStripLayout,
    /// The snap group all tabs (and the strip) must share, per invariant 3.
    pub snap_group: SnapGroupId,
}

impl TabGroup {
    #[must_use]
    pub fn new(
        id: TabGroupId,
        tab_strip: WindowId,
        tabs: Vec<WindowId>,
        active_tab: WindowId,
        layout: TabStripLayout,
        snap_group: SnapGroupId,
    ) -> Self {
        Self { id, tab_strip, tabs, active_tab, layout, snap_group }
    }

    #[must_use]
    pub fn contains(&self, id: &WindowId) -> bool { self.tabs.iter().any(|w| w == id) }

    #[must_use]
    pub fn index_of(&self, id: &WindowId) -> Option<usize> { self.tabs.iter().position(|w| w == id) }

    /// A tab group with fewer than 2 tabs is torn down.
    #[must_use]
    pub fn should_self_destruct(&self) -> bool { self.tabs.len() < 2 }

    /// The tab that becomes active when `removed` (the current active tab)
    /// leaves: the next tab in order, wrapping to the previous one if
    /// `removed` was last.
    #[must_use]
    pub fn next_active_after_removing(&self, removed: &WindowId) -> Option<WindowId> {
        let idx = self.index_of(removed)?;
        let remaining: Vec<&WindowId> = self.tabs.iter().filter(|w| *w != removed).collect();
        if remaining.is_empty() {
            return None;
        }
        if idx + 1 < self.tabs.len() {
            // There was a next tab; its position in `remaining` is `idx`
            // (everything before `removed` keeps its index).
            remaining.get(idx).copied().cloned()
        } else {
            remaining.last().copied().cloned()
        }
    }

    /// Geometry as an entity: `tabStripRect ∪ activeBodyRect`, with the
    /// strip stacked above the active tab's body.
    #[must_use]
    pub fn rect(&self, model: &DesktopModel) -> Rect {
        let strip = model.get_window(&self.tab_strip).map_or_else(Rect::zero, |w| w.state.rect);
        let active = model.get_window(&self.active_tab).map_or_else(Rect::zero, |w| w.state.rect);
        let center = Point::new(active.center.x, active.center.y - strip.half_size.y);
        let half_size = Point::new(active.half_size.x, active.half_size.y + strip.half_size.y);
        Rect::new(center, half_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_active_wraps_to_previous_when_last_removed() {
        let strip = WindowId::new("app", "strip");
        let x = WindowId::new("app", "x");
        let y = WindowId::new("app", "y");
        let z = WindowId::new("app", "z");
        let group =
            TabGroup::new(1, strip, vec![x.clone(), y.clone(), z.clone()], z.clone(), TabStripLayout::default(), 1);
        assert_eq!(group.next_active_after_removing(&z), Some(y));
    }

    #[test]
    fn next_active_picks_successor_in_order() {
        let strip = WindowId::new("app", "strip");
        let x = WindowId::new("app", "x");
        let y = WindowId::new("app", "y");
        let z = WindowId::new("app", "z");
        let group =
            TabGroup::new(1, strip, vec![x.clone(), y.clone(), z.clone()], x.clone(), TabStripLayout::default(), 1);
        assert_eq!(group.next_active_after_removing(&x), Some(y));
    }

    #[test]
    fn should_self_destruct_below_two_tabs() {
        let strip = WindowId::new("app", "strip");
        let x = WindowId::new("app", "x");
        let group = TabGroup::new(1, strip, vec![x.clone()], x, TabStripLayout::default(), 1);
        assert!(group.should_self_destruct());
    }
}
