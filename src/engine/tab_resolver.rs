//! The tab resolver: given a drag position, finds the tab group whose
//! `tabStrip ∪ activeBody` region contains the cursor.

use std::collections::HashMap;

use crate::engine::entity::EntityView;
use crate::engine::geometry::Point;
use crate::engine::model::DesktopModel;
use crate::engine::window::{TabGroupId, WindowId};

/// Tracks window focus/activation order so the resolver can break ties by
/// z-order (topmost wins) when a drag point lands over multiple tab strips.
#[derive(Debug, Default)]
pub struct ZOrderIndex {
    rank: HashMap<WindowId, u64>,
    next_rank: u64,
}

impl ZOrderIndex {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Records `id` as the most recently focused/activated window.
    pub fn record_focus(&mut self, id: WindowId) {
        self.next_rank += 1;
        self.rank.insert(id, self.next_rank);
    }

    fn rank_of(&self, id: &WindowId) -> u64 { self.rank.get(id).copied().unwrap_or(0) }
}

/// Hit-tests `point` against every tab group whose active tab is visible.
/// Ties are broken by z-order (the topmost tab strip wins). Returns `None`
/// if the dragging window is itself a tab of the winning group (drop on
/// self is a no-op), or if nothing was hit.
pub fn resolve(
    model: &DesktopModel,
    point: Point,
    dragging: &WindowId,
    z_order: &ZOrderIndex,
) -> Option<TabGroupId> {
    let mut best: Option<(TabGroupId, u64)> = None;

    for group in model.tab_groups() {
        let Some(active) = model.get_window(&group.active_tab) else { continue };
        if active.state.hidden {
            continue;
        }
        if !crate::engine::entity::Entity::TabGroup(group.id).contains(point, model) {
            continue;
        }
        let rank = z_order.rank_of(&group.tab_strip);
        if best.is_none_or(|(_, best_rank)| rank > best_rank) {
            best = Some((group.id, rank));
        }
    }

    let (hit, _) = best?;
    let group = model.get_tab_group(hit)?;
    if group.contains(dragging) {
        return None;
    }
    Some(hit)
}
