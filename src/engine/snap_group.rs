//! Snap group: a set of windows currently snapped edge-to-edge, moved as a unit.
//!
//! Membership mutation lives on [`crate::engine::model::DesktopModel`] rather
//! than on this type, so that windows and groups cross-reference each other
//! only through stable ids (see `DESIGN.md`, "Ownership graphs").

use crate::engine::entity::Entity;
use crate::engine::geometry::{Point, Rect};
use crate::engine::model::DesktopModel;
use crate::engine::window::{SnapGroupId, WindowId};

/// Lazily-recomputed, root-relative bounding box.
#[derive(Clone, Copy, Debug, Default)]
pub struct CachedBounds {
    pub origin: Point,
    pub half_size: Point,
    pub stale: bool,
}

#[derive(Clone, Debug)]
pub struct SnapGroup {
    pub id: SnapGroupId,
    pub windows: Vec<WindowId>,
    /// Reference window the cached bounds are relative to: `windows[0]`
    /// unless that window is a tab in a multi-tab tab group, in which case
    /// the tab strip window.
    pub root: Option<WindowId>,
    pub bounds: CachedBounds,
    /// Set on an aborted move so a failed commit can restore membership.
    pub prev_group: Option<SnapGroupId>,
}

impl SnapGroup {
    #[must_use]
    pub fn new(id: SnapGroupId, first: WindowId) -> Self {
        Self {
            id,
            root: Some(first.clone()),
            windows: vec![first],
            bounds: CachedBounds { stale: true, ..CachedBounds::default() },
            prev_group: None,
        }
    }

    /// Size >= 2 is "grouped" to the client API; size 1 reports ungrouped.
    #[must_use]
    pub fn is_grouped(&self) -> bool { self.windows.len() >= 2 }

    #[must_use]
    pub fn contains(&self, id: &WindowId) -> bool { self.windows.iter().any(|w| w == id) }

    pub fn mark_stale(&mut self) { self.bounds.stale = true; }

    /// Recomputes `root` from `windows[0]`: the tab strip if that window is
    /// one of ≥ 2 tabs in a tab group, else the window itself. Always marks
    /// bounds stale, since `origin` is root-relative.
    pub fn recompute_root(&mut self, model: &DesktopModel) {
        self.root = self.windows.first().map(|first| {
            model
                .get_window(first)
                .and_then(|w| w.tab_group)
                .and_then(|tg| model.get_tab_group(tg))
                .filter(|tg| tg.tabs.len() >= 2)
                .map_or_else(|| first.clone(), |tg| tg.tab_strip.clone())
        });
        self.mark_stale();
    }

    /// The entities this group presents to the snap resolver: each member
    /// window, except that a multi-tab tab group appears once in place of
    /// its tabs.
    #[must_use]
    pub fn entities(&self, model: &DesktopModel) -> Vec<Entity> {
        let mut seen_tab_groups = Vec::new();
        let mut out = Vec::new();
        for id in &self.windows {
            let tab_group = model
                .get_window(id)
                .and_then(|w| w.tab_group)
                .filter(|tg| model.get_tab_group(*tg).is_some_and(|g| g.tabs.len() >= 2));
            match tab_group {
                Some(tg) => {
                    if !seen_tab_groups.contains(&tg) {
                        seen_tab_groups.push(tg);
                        out.push(Entity::TabGroup(tg));
                    }
                }
                None => out.push(Entity::Window(id.clone())),
            }
        }
        out
    }

    /// Recomputes the cached bounds if stale, then returns the absolute
    /// bounding rect. Excludes hidden and non-normal-state windows when
    /// ≥ 2 such windows are visible; falls back to the sole visible
    /// window's rect, or a zero rect when nothing is visible.
    #[must_use]
    pub fn absolute_rect(&mut self, model: &DesktopModel) -> Rect {
        if self.bounds.stale {
            self.recompute(model);
        }
        let root_center =
            self.root.as_ref().and_then(|r| model.get_window(r)).map_or(Point::zero(), |w| w.state.rect.center);
        Rect::new(root_center.add(self.bounds.origin), self.bounds.half_size)
    }

    fn recompute(&mut self, model: &DesktopModel) {
        let visible: Vec<Rect> = self
            .windows
            .iter()
            .filter_map(|id| model.get_window(id))
            .filter(|w| w.state.counts_toward_bounds())
            .map(|w| w.state.rect)
            .collect();

        let root_center =
            self.root.as_ref().and_then(|r| model.get_window(r)).map_or(Point::zero(), |w| w.state.rect.center);

        self.bounds = match visible.len() {
            0 => CachedBounds::default(),
            1 => CachedBounds { origin: Point::zero(), half_size: visible[0].half_size, stale: false },
            _ => {
                let mut min = visible[0].min();
                let mut max = visible[0].max();
                for r in &visible[1..] {
                    let (rmin, rmax) = (r.min(), r.max());
                    min = Point::new(min.x.min(rmin.x), min.y.min(rmin.y));
                    max = Point::new(max.x.max(rmax.x), max.y.max(rmax.y));
                }
                let hull = Rect::from_min_max(min, max);
                CachedBounds { origin: hull.center.sub(root_center), half_size: hull.half_size, stale: false }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::{ManagedWindow, WindowState};

    fn model_with(rects: &[(&str, Rect)]) -> (DesktopModel, Vec<WindowId>) {
        let mut model = DesktopModel::new();
        let mut ids = Vec::new();
        for (name, rect) in rects {
            let id = WindowId::new("app", *name);
            model.create_window(id.clone(), WindowState::new(*rect));
            ids.push(id);
        }
        (model, ids)
    }

    #[test]
    fn single_window_bounds_equal_its_rect() {
        let rect = Rect::new(Point::new(10.0, 10.0), Point::new(50.0, 40.0));
        let (model, ids) = model_with(&[("a", rect)]);
        let group_id = model.get_window(&ids[0]).unwrap().snap_group;
        let mut group = model.get_snap_group(group_id).unwrap().clone();
        let out = group.absolute_rect(&model);
        assert_eq!(out.center, rect.center);
        assert_eq!(out.half_size, rect.half_size);
    }

    #[test]
    fn two_window_bounds_are_the_hull() {
        let a = Rect::new(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let b = Rect::new(Point::new(200.0, 0.0), Point::new(50.0, 50.0));
        let (mut model, ids) = model_with(&[("a", a), ("b", b)]);
        let group_id = model.get_window(&ids[0]).unwrap().snap_group;
        model.move_window_to_snap_group(&ids[1], group_id);
        let mut group = model.get_snap_group(group_id).unwrap().clone();
        let out = group.absolute_rect(&model);
        assert_eq!(out.center, Point::new(100.0, 0.0));
        assert_eq!(out.half_size, Point::new(150.0, 50.0));
    }

    #[test]
    fn hidden_members_are_excluded_from_bounds() {
        let a = Rect::new(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let b = Rect::new(Point::new(200.0, 0.0), Point::new(50.0, 50.0));
        let (mut model, ids) = model_with(&[("a", a), ("b", b)]);
        let group_id = model.get_window(&ids[0]).unwrap().snap_group;
        model.move_window_to_snap_group(&ids[1], group_id);
        model.apply_window_delta(&ids[1], &crate::engine::window::StateDelta {
            hidden: Some(true),
            ..Default::default()
        });
        let mut group = model.get_snap_group(group_id).unwrap().clone();
        let out = group.absolute_rect(&model);
        assert_eq!(out.center, a.center);
        assert_eq!(out.half_size, a.half_size);
    }
}
