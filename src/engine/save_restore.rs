//! Save/restore: serializes tab groups to a blob and reconstructs them.
//!
//! Snap-group membership is not part of the blob — only tab grouping is
//! persisted, per §4.9. Restoring re-creates a tab-strip window for each
//! surviving group and lets the ordinary `createTabGroup` path place it.

use serde::{Deserialize, Serialize};

use crate::engine::model::DesktopModel;
use crate::engine::signals::EventBatch;
use crate::engine::tab_group::TabStripLayout;
use crate::engine::window::{TabGroupId, WindowId, WindowState};
use crate::error::LayoutResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDimensions {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub tab_group_height: f64,
    pub app_height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGroupInfo {
    pub url: String,
    pub active: WindowId,
    pub dimensions: SavedDimensions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedTabGroup {
    pub tabs: Vec<WindowId>,
    pub group_info: SavedGroupInfo,
}

/// Serializes every tab group currently in `model`.
#[must_use]
pub fn save(model: &DesktopModel) -> Vec<SavedTabGroup> {
    model
        .tab_groups()
        .map(|group| {
            let strip_rect = model.get_window(&group.tab_strip).map_or_else(Default::default, |w| w.state.rect);
            let active_rect = model.get_window(&group.active_tab).map_or_else(Default::default, |w| w.state.rect);
            SavedTabGroup {
                tabs: group.tabs.clone(),
                group_info: SavedGroupInfo {
                    url: group.layout.url.clone(),
                    active: group.active_tab.clone(),
                    dimensions: SavedDimensions {
                        x: active_rect.min().x,
                        y: strip_rect.min().y,
                        width: active_rect.width(),
                        tab_group_height: group.layout.tab_group_height,
                        app_height: group.layout.app_height,
                    },
                },
            }
        })
        .collect()
}

/// Reconstructs tab groups from `blobs` into `model`. Windows listed in a
/// blob that are not present in `model` are skipped; if fewer than 2 listed
/// tabs survive, that blob's group is not recreated. A synthetic tab-strip
/// window is created for each surviving group, since the blob does not list
/// one (only the runtime adapter can have created the original).
pub fn restore(model: &mut DesktopModel, blobs: &[SavedTabGroup]) -> LayoutResult<(Vec<TabGroupId>, EventBatch)> {
    let mut ids = Vec::new();
    let mut events = Vec::new();

    for (index, blob) in blobs.iter().enumerate() {
        let surviving: Vec<WindowId> =
            blob.tabs.iter().filter(|id| model.get_window(id).is_some()).cloned().collect();
        if surviving.len() < 2 {
            continue;
        }

        let dims = &blob.group_info.dimensions;
        let strip_half = crate::engine::geometry::Point::new(dims.width / 2.0, dims.tab_group_height / 2.0);
        let strip_center = crate::engine::geometry::Point::new(
            dims.x + dims.width / 2.0,
            dims.y + dims.tab_group_height / 2.0,
        );
        let strip_rect = crate::engine::geometry::Rect::new(strip_center, strip_half);
        let tab_strip = WindowId::new(format!("restored-strip-{index}"), blob.group_info.url.clone());
        model.create_window(tab_strip.clone(), WindowState::new(strip_rect));

        let active = if surviving.contains(&blob.group_info.active) {
            blob.group_info.active.clone()
        } else {
            surviving[0].clone()
        };

        let layout = TabStripLayout {
            url: blob.group_info.url.clone(),
            tab_group_height: dims.tab_group_height,
            app_height: dims.app_height,
        };
        let (id, group_events) = model.create_tab_group(tab_strip, surviving, active, layout)?;
        ids.push(id);
        events.extend(group_events);
    }

    Ok((ids, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::{Point, Rect};
    use crate::engine::window::WindowId;

    fn rect(x: f64, y: f64, hx: f64, hy: f64) -> Rect { Rect::new(Point::new(x, y), Point::new(hx, hy)) }

    #[test]
    fn save_then_restore_round_trips_membership() {
        let mut model = DesktopModel::new();
        let strip = WindowId::new("app", "strip");
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(strip.clone(), WindowState::new(rect(0.0, -20.0, 100.0, 16.0)));
        model.create_window(a.clone(), WindowState::new(rect(0.0, 50.0, 100.0, 50.0)));
        model.create_window(b.clone(), WindowState::new(rect(0.0, 50.0, 100.0, 50.0)));
        model.create_tab_group(strip, vec![a.clone(), b.clone()], b.clone(), TabStripLayout::default()).unwrap();

        let blob = save(&model);
        assert_eq!(blob.len(), 1);
        assert_eq!(blob[0].tabs, vec![a.clone(), b.clone()]);
        assert_eq!(blob[0].group_info.active, b);

        let mut fresh = DesktopModel::new();
        fresh.create_window(a.clone(), WindowState::new(rect(0.0, 0.0, 10.0, 10.0)));
        fresh.create_window(b.clone(), WindowState::new(rect(0.0, 0.0, 10.0, 10.0)));
        let (ids, _) = restore(&mut fresh, &blob).unwrap();
        assert_eq!(ids.len(), 1);
        let restored = fresh.get_tab_group(ids[0]).unwrap();
        assert_eq!(restored.tabs, vec![a, b.clone()]);
        assert_eq!(restored.active_tab, b);
    }

    #[test]
    fn blob_with_a_missing_window_and_fewer_than_two_survivors_is_skipped() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        model.create_window(a.clone(), WindowState::new(rect(0.0, 0.0, 10.0, 10.0)));

        let blob = vec![SavedTabGroup {
            tabs: vec![a, WindowId::new("app", "missing")],
            group_info: SavedGroupInfo {
                url: "about:blank".into(),
                active: WindowId::new("app", "a"),
                dimensions: SavedDimensions { x: 0.0, y: 0.0, width: 100.0, tab_group_height: 36.0, app_height: 0.0 },
            },
        }];
        let (ids, events) = restore(&mut model, &blob).unwrap();
        assert!(ids.is_empty());
        assert!(events.is_empty());
    }
}
