//! snaptile - a desktop window layout engine.
//!
//! This crate is a library first: [`engine`] is the runtime-agnostic layout
//! core (desktop model, snap/tab resolvers, configuration store, and the
//! actor that orchestrates them). A window-management host embeds it behind
//! a concrete [`engine::adapter::WindowRuntimeAdapter`]; the binary shipped
//! alongside this library only manages the on-disk configuration manifest
//! (see `main.rs` and [`cli`]).

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;

pub use engine::{ClientEvent, ClientRequest, ClientResponse, DesktopModel, EngineHandle, LayoutEngine};
pub use error::{LayoutError, LayoutResult};

/// Initializes `tracing` for the `snaptile` binary, honoring `RUST_LOG` (or
/// a sensible default) via `EnvFilter`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snaptile=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
