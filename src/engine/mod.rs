//! The layout engine: desktop model, resolvers, configuration store, and the
//! actor that orchestrates them.
//!
//! Everything under this module is runtime-agnostic — it never touches an
//! OS window directly, only [`adapter::WindowRuntimeAdapter`]. See
//! `DESIGN.md` for the grounding of each submodule.

pub mod actor;
pub mod adapter;
pub mod client;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod model;
pub mod save_restore;
pub mod signals;
pub mod snap_group;
pub mod snap_resolver;
pub mod tab_group;
pub mod tab_resolver;
pub mod window;

pub use actor::{ConfigUpdate, EngineHandle, EngineHandleError, EngineMessage, LayoutEngine};
pub use client::{ClientEvent, ClientRequest, ClientResponse};
pub use model::DesktopModel;
