//! The window-runtime adapter boundary.
//!
//! The engine is written against this trait rather than any concrete OS
//! integration — native AX/X11/Win32 bindings live outside this crate.
//! [`NullAdapter`] is the only implementation shipped here: a bookkeeping
//! stub good enough for tests and for a headless engine instance.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::engine::geometry::{Point, Rect};
use crate::engine::window::{WindowId, WindowState};
use crate::error::{LayoutError, LayoutResult};

/// A runtime-pushed notification the adapter delivers through
/// [`WindowRuntimeAdapter::subscribe`].
#[derive(Clone, Debug, PartialEq)]
pub enum AdapterEvent {
    Created { id: WindowId, state: WindowState },
    Closed { id: WindowId },
    Focused { id: WindowId },
    BoundsChanged { id: WindowId, rect: Rect },
    StateChanged { id: WindowId, state: crate::engine::window::RunState },
    FrameChanged { id: WindowId, frame: bool },
    HiddenChanged { id: WindowId, hidden: bool },
}

/// The per-window command set a concrete window-management backend must
/// implement, plus the two pieces of drag state the resolvers need that
/// aren't per-window: cursor position and drag offset.
pub trait WindowRuntimeAdapter: Send {
    fn enumerate_windows(&self) -> Vec<(WindowId, WindowState)>;

    /// Registers a callback invoked for every event the adapter observes.
    /// Only one subscriber is supported; a later call replaces the former.
    fn subscribe(&self, on_event: Box<dyn Fn(AdapterEvent) + Send + Sync>);

    fn move_to(&self, id: &WindowId, pos: Point) -> LayoutResult<()>;
    fn resize_to(&self, id: &WindowId, size: Point) -> LayoutResult<()>;
    fn set_bounds(&self, id: &WindowId, rect: Rect) -> LayoutResult<()>;
    fn join_group(&self, id: &WindowId, other: &WindowId) -> LayoutResult<()>;
    fn leave_group(&self, id: &WindowId) -> LayoutResult<()>;
    fn close(&self, id: &WindowId, force: bool) -> LayoutResult<()>;
    fn show(&self, id: &WindowId) -> LayoutResult<()>;
    fn hide(&self, id: &WindowId) -> LayoutResult<()>;
    fn get_bounds(&self, id: &WindowId) -> LayoutResult<Rect>;
    fn get_options(&self, id: &WindowId) -> LayoutResult<WindowState>;

    fn cursor_position(&self) -> Point;
    fn drag_offset(&self) -> Point;
}

/// A bookkeeping stub: records the last state it was told about and accepts
/// every command unless the target window was never registered. Used by the
/// CLI binary (which has no real window-management backend to speak to) and
/// by tests that drive the engine through [`crate::engine::EngineHandle`]
/// directly rather than through adapter-originated events.
#[derive(Default)]
pub struct NullAdapter {
    windows: Mutex<HashMap<WindowId, WindowState>>,
    subscriber: Mutex<Option<Box<dyn Fn(AdapterEvent) + Send + Sync>>>,
}

impl NullAdapter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a window as if the runtime had just announced it, and
    /// fires the corresponding [`AdapterEvent::Created`] to the subscriber.
    pub fn register(&self, id: WindowId, state: WindowState) {
        self.windows.lock().unwrap().insert(id.clone(), state.clone());
        self.emit(AdapterEvent::Created { id, state });
    }

    fn emit(&self, event: AdapterEvent) {
        if let Some(cb) = self.subscriber.lock().unwrap().as_ref() {
            cb(event);
        }
    }

    fn require(&self, id: &WindowId) -> LayoutResult<()> {
        if self.windows.lock().unwrap().contains_key(id) {
            Ok(())
        } else {
            Err(LayoutError::NotFound(id.to_string()))
        }
    }
}

impl WindowRuntimeAdapter for NullAdapter {
    fn enumerate_windows(&self) -> Vec<(WindowId, WindowState)> {
        self.windows.lock().unwrap().iter().map(|(id, s)| (id.clone(), s.clone())).collect()
    }

    fn subscribe(&self, on_event: Box<dyn Fn(AdapterEvent) + Send + Sync>) {
        *self.subscriber.lock().unwrap() = Some(on_event);
    }

    fn move_to(&self, id: &WindowId, pos: Point) -> LayoutResult<()> {
        self.require(id)?;
        if let Some(state) = self.windows.lock().unwrap().get_mut(id) {
            state.rect = state.rect.translated(pos.sub(state.rect.center));
        }
        Ok(())
    }

    fn resize_to(&self, id: &WindowId, size: Point) -> LayoutResult<()> {
        self.require(id)?;
        if let Some(state) = self.windows.lock().unwrap().get_mut(id) {
            state.rect.half_size = size;
        }
        Ok(())
    }

    fn set_bounds(&self, id: &WindowId, rect: Rect) -> LayoutResult<()> {
        self.require(id)?;
        if let Some(state) = self.windows.lock().unwrap().get_mut(id) {
            state.rect = rect;
        }
        Ok(())
    }

    fn join_group(&self, id: &WindowId, other: &WindowId) -> LayoutResult<()> {
        self.require(id)?;
        self.require(other)?;
        Ok(())
    }

    fn leave_group(&self, id: &WindowId) -> LayoutResult<()> { self.require(id) }

    fn close(&self, id: &WindowId, _force: bool) -> LayoutResult<()> {
        self.require(id)?;
        self.windows.lock().unwrap().remove(id);
        self.emit(AdapterEvent::Closed { id: id.clone() });
        Ok(())
    }

    fn show(&self, id: &WindowId) -> LayoutResult<()> {
        self.require(id)?;
        if let Some(state) = self.windows.lock().unwrap().get_mut(id) {
            state.hidden = false;
        }
        Ok(())
    }

    fn hide(&self, id: &WindowId) -> LayoutResult<()> {
        self.require(id)?;
        if let Some(state) = self.windows.lock().unwrap().get_mut(id) {
            state.hidden = true;
        }
        Ok(())
    }

    fn get_bounds(&self, id: &WindowId) -> LayoutResult<Rect> {
        self.windows.lock().unwrap().get(id).map(|s| s.rect).ok_or_else(|| LayoutError::NotFound(id.to_string()))
    }

    fn get_options(&self, id: &WindowId) -> LayoutResult<WindowState> {
        self.windows.lock().unwrap().get(id).cloned().ok_or_else(|| LayoutError::NotFound(id.to_string()))
    }

    fn cursor_position(&self) -> Point { Point::zero() }

    fn drag_offset(&self) -> Point { Point::zero() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::Point;

    fn rect(x: f64, y: f64, hx: f64, hy: f64) -> Rect { Rect::new(Point::new(x, y), Point::new(hx, hy)) }

    #[test]
    fn unregistered_window_commands_fail() {
        let adapter = NullAdapter::new();
        let id = WindowId::new("app", "w");
        assert!(adapter.set_bounds(&id, rect(0.0, 0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn registered_window_reports_its_bounds() {
        let adapter = NullAdapter::new();
        let id = WindowId::new("app", "w");
        adapter.register(id.clone(), WindowState::new(rect(10.0, 10.0, 5.0, 5.0)));
        let bounds = adapter.get_bounds(&id).unwrap();
        assert_eq!(bounds.center, Point::new(10.0, 10.0));
    }

    #[test]
    fn subscriber_receives_created_event() {
        let adapter = NullAdapter::new();
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        adapter.subscribe(Box::new(move |event| seen_clone.lock().unwrap().push(event)));
        adapter.register(WindowId::new("app", "w"), WindowState::new(rect(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
