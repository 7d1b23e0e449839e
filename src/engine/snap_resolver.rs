//! The snap resolver: given a moving snap group and the cursor position,
//! proposes the single best validated edge-to-edge snap target, or none.

use crate::engine::entity::{Entity, EntityView};
use crate::engine::geometry::{Axis, Direction, Point, Rect};
use crate::engine::model::DesktopModel;
use crate::engine::window::{RunState, SnapGroupId, WindowId};

/// Snap radius: how close (edge-to-edge, on at least one axis) a candidate
/// group must be to even be considered.
pub const DEFAULT_SNAP_RADIUS: f64 = 30.0;

/// Minimum overlap on the parallel axis for a pairing to be a candidate,
/// unless the smaller of the two windows is narrower than this.
pub const DEFAULT_MIN_OVERLAP: f64 = 30.0;

/// Interior-overlap tolerance: below this area a pairing is not considered
/// an overlap for validity purposes.
const OVERLAP_EPSILON: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

/// A proposed commit action: destination group, offset vector, validity.
#[derive(Clone, Debug)]
pub struct SnapTarget {
    pub target_group: SnapGroupId,
    pub active_entity: Entity,
    pub snap_offset: Point,
    /// Set when the candidate held the moving window's half-size — the
    /// moving window should be resized to this before merging.
    pub half_size: Option<Point>,
    pub direction: Direction,
    pub validity: Validity,
}

/// Tunable parameters for a resolver invocation, so tests can probe the
/// boundary properties in §8 without touching the defaults.
#[derive(Clone, Copy, Debug)]
pub struct SnapResolverConfig {
    pub radius: f64,
    pub min_overlap: f64,
}

impl Default for SnapResolverConfig {
    fn default() -> Self {
        Self { radius: DEFAULT_SNAP_RADIUS, min_overlap: DEFAULT_MIN_OVERLAP }
    }
}

struct Pairing {
    candidate_group: SnapGroupId,
    candidate_rect: Rect,
    delta: f64,
    overlap: f64,
    direction: Direction,
}

/// Finds the best validated snap target for `moving_group` against every
/// other snap group, or `None` if nothing is within radius.
///
/// `snap_enabled` lets the caller gate participation by configuration
/// (`features.snap`) without the resolver depending on the config store.
pub fn resolve(
    model: &mut DesktopModel,
    moving_group: SnapGroupId,
    cursor: Point,
    cfg: SnapResolverConfig,
    snap_enabled: &dyn Fn(&WindowId) -> bool,
) -> Option<SnapTarget> {
    let moving_rect = model.snap_group_rect(moving_group)?;

    let candidate_ids: Vec<SnapGroupId> =
        model.snap_groups().filter(|g| g.id != moving_group).map(|g| g.id).collect();

    let mut best: Option<Pairing> = None;
    let mut best_center: Option<Point> = None;

    for candidate_id in candidate_ids {
        let Some(candidate_rect) = model.snap_group_rect(candidate_id) else { continue };
        if !within_radius(moving_rect, candidate_rect, cfg.radius) {
            continue;
        }

        for direction in [Direction::Left, Direction::Right, Direction::Top, Direction::Bottom] {
            let (delta, overlap) = moving_rect.edge_gap(&candidate_rect, direction);
            let min_overlap = effective_min_overlap(moving_rect, candidate_rect, direction.axis(), cfg.min_overlap);
            if delta.abs() > cfg.radius || overlap < min_overlap {
                continue;
            }

            let better = match &best {
                None => true,
                Some(b) if delta.abs() < b.delta.abs() - f64::EPSILON => true,
                Some(b) if (delta.abs() - b.delta.abs()).abs() <= f64::EPSILON && overlap > b.overlap => true,
                Some(b)
                    if (delta.abs() - b.delta.abs()).abs() <= f64::EPSILON && (overlap - b.overlap).abs() <= f64::EPSILON =>
                {
                    candidate_rect.center.distance(cursor) < best_center.unwrap_or(candidate_rect.center).distance(cursor)
                }
                _ => false,
            };

            if better {
                best_center = Some(candidate_rect.center);
                best = Some(Pairing { candidate_group: candidate_id, candidate_rect, delta, overlap, direction });
            }
        }
    }

    let pairing = best?;
    let snap_offset = offset_for(pairing.direction, pairing.delta);
    let moved_rect = moving_rect.translated(snap_offset);

    let validity =
        validate(model, moving_group, pairing.candidate_group, moved_rect, pairing.direction, snap_enabled);

    let active_entity = model
        .get_snap_group(moving_group)
        .and_then(|g| g.entities(model).into_iter().next())
        .unwrap_or_else(|| Entity::Window(WindowId::new("", "")));

    Some(SnapTarget {
        target_group: pairing.candidate_group,
        active_entity,
        snap_offset,
        half_size: None,
        direction: pairing.direction,
        validity,
    })
}

fn within_radius(a: Rect, b: Rect, radius: f64) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    let horizontal_gap = (b_min.x - a_max.x).max(a_min.x - b_max.x).max(0.0);
    let vertical_gap = (b_min.y - a_max.y).max(a_min.y - b_max.y).max(0.0);
    horizontal_gap <= radius || vertical_gap <= radius
}

fn effective_min_overlap(a: Rect, b: Rect, axis: Axis, default_min: f64) -> f64 {
    let (a_extent, b_extent) = match axis {
        Axis::Horizontal => (a.height(), b.height()),
        Axis::Vertical => (a.width(), b.width()),
    };
    let smaller_side = a_extent.min(b_extent);
    default_min.min(smaller_side)
}

fn offset_for(direction: Direction, delta: f64) -> Point {
    match direction {
        Direction::Right => Point::new(delta, 0.0),
        Direction::Left => Point::new(-delta, 0.0),
        Direction::Bottom => Point::new(0.0, delta),
        Direction::Top => Point::new(0.0, -delta),
    }
}

#[allow(clippy::too_many_arguments)]
fn validate(
    model: &DesktopModel,
    moving_group: SnapGroupId,
    candidate_group: SnapGroupId,
    moved_rect: Rect,
    direction: Direction,
    snap_enabled: &dyn Fn(&WindowId) -> bool,
) -> Validity {
    let Some(moving) = model.get_snap_group(moving_group) else { return Validity::Invalid };
    let Some(candidate) = model.get_snap_group(candidate_group) else { return Validity::Invalid };

    for w in &moving.windows {
        if !snap_enabled(w) {
            return Validity::Invalid;
        }
    }

    for w in &candidate.windows {
        if !snap_enabled(w) {
            return Validity::Invalid;
        }
        let Some(window) = model.get_window(w) else { continue };
        if matches!(window.state.state, RunState::Maximized | RunState::Minimized)
            && moved_rect.overlap_area(&window.state.rect) > OVERLAP_EPSILON
        {
            return Validity::Invalid;
        }
        if window.state.counts_toward_bounds() && moved_rect.overlap_area(&window.state.rect) > OVERLAP_EPSILON {
            return Validity::Invalid;
        }
    }

    let moving_entities = moving.entities(model);
    let candidate_entities = candidate.entities(model);
    let both_tab_groups = moving_entities.iter().any(|e| matches!(e, Entity::TabGroup(_)))
        && candidate_entities.iter().any(|e| matches!(e, Entity::TabGroup(_)));
    if both_tab_groups && matches!(direction, Direction::Top | Direction::Bottom) {
        // A vertical stack of two tab groups would force one strip out from
        // the top of its own body; tab strips must remain on top.
        return Validity::Invalid;
    }

    Validity::Valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::WindowState;

    fn always_enabled(_: &WindowId) -> bool { true }

    fn rect(x: f64, y: f64, hx: f64, hy: f64) -> Rect { Rect::new(Point::new(x, y), Point::new(hx, hy)) }

    #[test]
    fn s1_snap_within_radius_offsets_toward_target() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(a, WindowState::new(rect(100.0, 100.0, 50.0, 50.0)));
        let gb = model.create_window(b, WindowState::new(rect(202.0, 100.0, 50.0, 50.0)));

        let target =
            resolve(&mut model, gb, Point::new(202.0, 100.0), SnapResolverConfig::default(), &always_enabled).unwrap();
        assert_eq!(target.validity, Validity::Valid);
        assert_eq!(target.snap_offset, Point::new(-2.0, 0.0));
    }

    #[test]
    fn s2_no_snap_beyond_radius() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(a, WindowState::new(rect(100.0, 100.0, 50.0, 50.0)));
        let gb = model.create_window(b, WindowState::new(rect(242.0, 100.0, 50.0, 50.0)));

        let target = resolve(&mut model, gb, Point::new(242.0, 100.0), SnapResolverConfig::default(), &always_enabled);
        assert!(target.is_none());
    }

    #[test]
    fn radius_boundary_matches_exactly_at_r() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(a, WindowState::new(rect(0.0, 0.0, 50.0, 50.0)));
        // Gap is exactly DEFAULT_SNAP_RADIUS (30): a's right edge at x=50,
        // b's left edge at x=80.
        let gb = model.create_window(b, WindowState::new(rect(130.0, 0.0, 50.0, 50.0)));

        let target = resolve(&mut model, gb, Point::new(130.0, 0.0), SnapResolverConfig::default(), &always_enabled);
        assert!(target.is_some());
    }

    #[test]
    fn radius_boundary_one_over_does_not_match() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(a, WindowState::new(rect(0.0, 0.0, 50.0, 50.0)));
        let gb = model.create_window(b, WindowState::new(rect(131.0, 0.0, 50.0, 50.0)));

        let target = resolve(&mut model, gb, Point::new(131.0, 0.0), SnapResolverConfig::default(), &always_enabled);
        assert!(target.is_none());
    }

    #[test]
    fn disabled_window_yields_invalid_target() {
        let mut model = DesktopModel::new();
        let a = WindowId::new("app", "a");
        let b = WindowId::new("app", "b");
        model.create_window(a.clone(), WindowState::new(rect(100.0, 100.0, 50.0, 50.0)));
        let gb = model.create_window(b, WindowState::new(rect(202.0, 100.0, 50.0, 50.0)));

        let enabled_except_a = |w: &WindowId| *w != a;
        let target =
            resolve(&mut model, gb, Point::new(202.0, 100.0), SnapResolverConfig::default(), &enabled_except_a)
                .unwrap();
        assert_eq!(target.validity, Validity::Invalid);
    }
}
