//! Configuration manifest template generation.

use std::fs;
use std::path::Path;

/// Generates a manifest template with every option commented out.
#[must_use]
pub fn generate_manifest_template() -> String {
    r##"// snaptile configuration manifest
// ================================
// JSONC format (JSON with comments). Everything below is commented out
// and shows the default behavior; uncomment and edit what you need.

{
  // Service-wide defaults, applied before any rule narrows them.
  "service": {
    // Master switch for engine participation. Defaults to true.
    // "enabled": true,

    // Per-feature toggles.
    // "features": {
    //   "snap": true,
    //   "tab": true,
    //   "dock": true
    // },

    // Default tab-strip window appearance.
    // "tabstrip": {
    //   "url": "about:blank",
    //   "height": 36
    // }
  },

  // Scoped overrides. Each rule narrows `service` to an application or a
  // specific window; `uuid`/`name` accept either a literal string or
  // `{ "expression": "...", "flags": "i", "invert": false }` for a regex
  // match.
  "rules": [
    // {
    //   "level": "application",
    //   "uuid": "com.example.app",
    //   "config": { "enabled": false }
    // },
    // {
    //   "level": "window",
    //   "uuid": "com.example.app",
    //   "name": "Inspector",
    //   "config": { "features": { "snap": false } }
    // }
  ]
}
"##
    .to_string()
}

/// Writes the template to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the parent directory can't be created or the file
/// can't be written.
pub fn create_manifest_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, generate_manifest_template())
}
