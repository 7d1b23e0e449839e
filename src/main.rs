#![allow(clippy::multiple_crate_versions)]

//! snaptile - CLI front-end for the layout engine's configuration manifest.
//!
//! The engine itself is a library meant to be embedded by a window-management
//! host; this binary only manages the on-disk manifest (`init`, `path`,
//! `validate`), exports its JSON Schema, and generates shell completions.

fn main() {
    snaptile::init_tracing();

    if let Err(err) = snaptile::cli::run() {
        eprintln!("snaptile: {err}");
        std::process::exit(1);
    }
}
