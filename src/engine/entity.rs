//! A uniform façade over "a single managed window" or "a tab group".
//!
//! The snap resolver treats a multi-tab tab group as one geometric object —
//! the resolver only ever consumes the small [`EntityView`] interface, never
//! the concrete window or tab-group types. This is a tagged variant rather
//! than a trait object: the model owns windows and tab groups by id, so an
//! `Entity` is itself just an id pair that the view methods resolve through
//! the model (see `DESIGN.md`, "Ownership graphs").

use crate::engine::geometry::{Point, Rect};
use crate::engine::model::DesktopModel;
use crate::engine::window::{TabGroupId, WindowId};

/// A snap-resolver participant: either a standalone window or a tab group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Window(WindowId),
    TabGroup(TabGroupId),
}

/// The small interface the snap resolver consumes. Kept separate from
/// `Entity` itself so call sites read as "ask the entity" rather than
/// "match on the entity and look it up".
pub trait EntityView {
    fn rect(&self, model: &DesktopModel) -> Option<Rect>;
    fn contains(&self, point: Point, model: &DesktopModel) -> bool;
}

impl EntityView for Entity {
    fn rect(&self, model: &DesktopModel) -> Option<Rect> {
        match self {
            Self::Window(id) => model.get_window(id).map(|w| w.state.rect),
            Self::TabGroup(id) => model.get_tab_group(*id).map(|t| t.rect(model)),
        }
    }

    fn contains(&self, point: Point, model: &DesktopModel) -> bool {
        self.rect(model).is_some_and(|r| r.contains_point(point))
    }
}
