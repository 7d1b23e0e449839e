//! Configuration file watcher for hot-reloading.
//!
//! Watches the manifest file for changes and re-applies it against a running
//! engine, rather than restarting the process — the donor's watcher restarts
//! a Tauri app on change; this crate has no such process to restart, so a
//! change instead becomes a `removeFromSource` + `add` pair against the
//! engine's `ConfigurationStore`, at `Scope::Service`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::load_manifest_from_path;
use crate::engine::config::Scope;
use crate::engine::{ConfigUpdate, EngineHandle, EngineMessage};

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Starts watching `path` for changes, spawning a background thread that
/// reloads the manifest and pushes it into `handle`'s engine on every
/// debounced change.
///
/// The thread runs until `handle`'s engine shuts down (detected via
/// [`EngineHandle::is_alive`] after a send failure) or the watcher itself
/// fails to initialize.
pub fn watch_manifest(path: PathBuf, handle: EngineHandle) {
    let filename = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    std::thread::spawn(move || {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(%err, "failed to create configuration watcher");
                return;
            }
        };

        // Watch the parent directory, not the file itself: editors commonly
        // save by writing a temp file then renaming it over the target.
        let watch_path = path.parent().map_or_else(|| path.clone(), std::path::Path::to_path_buf);
        if let Err(err) = watcher.watch(&watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(%err, path = %watch_path.display(), "failed to watch configuration directory");
            return;
        }

        let mut last_event_time: Option<Instant> = None;
        let debounce_duration = Duration::from_millis(CONFIG_DEBOUNCE_MS);

        loop {
            match rx.recv() {
                Ok(Ok(event)) => {
                    let affects_manifest =
                        event.paths.iter().any(|p| p.file_name().is_some_and(|name| name == filename));
                    if !affects_manifest {
                        continue;
                    }

                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                        continue;
                    }
                    last_event_time = Some(now);

                    reload(&path, &handle);
                    if !handle.is_alive() {
                        tracing::debug!("layout engine is gone, stopping configuration watcher");
                        break;
                    }
                }
                Ok(Err(err)) => tracing::warn!(%err, "configuration watch error"),
                Err(_) => break,
            }
        }
    });
}

fn reload(path: &std::path::Path, handle: &EngineHandle) {
    let manifest = match load_manifest_from_path(path) {
        Ok(manifest) => manifest,
        Err(err) => {
            tracing::warn!(%err, path = %path.display(), "configuration file changed but failed to reload");
            return;
        }
    };

    let _ = handle.send(EngineMessage::ConfigChanged(ConfigUpdate::RemoveSource(Scope::Service)));
    let _ = handle.send(EngineMessage::ConfigChanged(ConfigUpdate::Add {
        source: Scope::Service,
        config: manifest.service,
        rules: manifest.rules,
    }));
    tracing::info!(path = %path.display(), "configuration reloaded");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_debounce_duration_is_reasonable() {
        const { assert!(CONFIG_DEBOUNCE_MS >= 100) };
        const { assert!(CONFIG_DEBOUNCE_MS <= 1000) };
    }

    #[test]
    fn debounce_duration_creates_valid_duration() {
        let duration = Duration::from_millis(CONFIG_DEBOUNCE_MS);
        assert_eq!(duration.as_millis(), u128::from(CONFIG_DEBOUNCE_MS));
    }
}
