//! CLI command definitions using Clap.
//!
//! A thin front-end: the engine itself is a library meant to be embedded by
//! a window-management host (see `crate::engine`), so the binary shipped
//! here only manages the on-disk configuration manifest and exposes the
//! manifest's JSON Schema — it does not run a daemon of its own.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, Manifest};
use crate::error::LayoutError;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// snaptile CLI - manage the configuration manifest for the snaptile layout engine.
#[derive(Parser, Debug)]
#[command(name = "snaptile")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Configuration manifest management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration manifest's JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout describing the manifest format. Can
    /// be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Configuration manifest management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new manifest file with all options documented.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  snaptile config init              # Create manifest at default location
  snaptile config init --force      # Overwrite existing manifest
  snaptile config init --path ~/my-config.jsonc  # Create at custom path
  snaptile config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing manifest file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the manifest file.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the manifest template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the manifest search paths.
    Path,

    /// Validate a manifest file.
    ///
    /// Parses the file at `path` (or the first manifest found on the search
    /// path) and reports the first error encountered, including rule-level
    /// scope violations the runtime configuration store itself would reject.
    Validate {
        /// Manifest file to validate. Defaults to the search path.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), LayoutError> {
        match &self.command {
            Commands::Config(cmd) => execute_config(cmd),
            Commands::Schema => {
                println!("{}", schema_json());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "snaptile", &mut io::stdout());
    }
}

fn execute_config(cmd: &ConfigCommands) -> Result<(), LayoutError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", config::template::generate_manifest_template());
                Ok(())
            } else {
                init_manifest(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_manifest_paths();
            Ok(())
        }
        ConfigCommands::Validate { path } => validate_manifest(path.clone()),
    }
}

fn init_manifest(force: bool, custom_path: Option<PathBuf>) -> Result<(), LayoutError> {
    let manifest_path =
        custom_path.unwrap_or_else(|| config::config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc")));

    if manifest_path.exists() && !force {
        return Err(LayoutError::InvalidState(format!(
            "configuration manifest already exists at: {}\nuse --force to overwrite",
            manifest_path.display()
        )));
    }

    config::template::create_manifest_file(&manifest_path).map_err(|e| {
        LayoutError::InvalidState(format!("failed to create manifest {}: {e}", manifest_path.display()))
    })?;

    println!("Configuration manifest created at: {}", manifest_path.display());
    println!("All options are commented out by default; uncomment the ones you want to configure.");
    Ok(())
}

fn show_manifest_paths() {
    println!("Configuration manifest search paths (in priority order):\n");
    let paths = config::config_paths();
    let mut found = false;
    for (i, path) in paths.iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found {
            found = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, path.display(), marker);
    }
    if !found {
        println!("\nNo manifest found. Run 'snaptile config init' to create one.");
    }
}

fn validate_manifest(path: Option<PathBuf>) -> Result<(), LayoutError> {
    let (manifest, source) = match path {
        Some(path) => {
            let manifest = config::load_manifest_from_path(&path)
                .map_err(|e| LayoutError::InvalidState(format!("{}: {e}", path.display())))?;
            (manifest, path)
        }
        None => config::load_manifest().map_err(|e| LayoutError::InvalidState(e.to_string()))?,
    };

    validate_against_store(&manifest)?;
    println!("{} is valid ({} rule(s)).", source.display(), manifest.rules.len());
    Ok(())
}

/// Replays the manifest against a scratch `ConfigurationStore`, surfacing
/// the same `InvalidScope` rejection a running engine would apply at load
/// time (see the store's own rule-level-vs-source-scope check).
fn validate_against_store(manifest: &Manifest) -> Result<(), LayoutError> {
    let mut store = crate::engine::config::ConfigurationStore::new();
    store.add(crate::engine::config::Scope::Service, manifest.service.clone(), manifest.rules.clone())
}

fn schema_json() -> String {
    let schema = schemars::schema_for!(Manifest);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_init() {
        let cli = Cli::try_parse_from(["snaptile", "config", "init", "--stdout"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init { stdout, .. }) => assert!(stdout),
            _ => panic!("expected Config Init command"),
        }
    }

    #[test]
    fn parses_config_path() {
        let cli = Cli::try_parse_from(["snaptile", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }

    #[test]
    fn parses_config_validate_with_path() {
        let cli = Cli::try_parse_from(["snaptile", "config", "validate", "/tmp/config.jsonc"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Validate { path }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/config.jsonc")));
            }
            _ => panic!("expected Config Validate command"),
        }
    }

    #[test]
    fn parses_schema() {
        let cli = Cli::try_parse_from(["snaptile", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn parses_completions_zsh() {
        let cli = Cli::try_parse_from(["snaptile", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("expected Completions command"),
        }
    }

    #[test]
    fn app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }

    #[test]
    fn schema_json_is_an_object() {
        let value: serde_json::Value = serde_json::from_str(&schema_json()).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn validate_accepts_a_rule_narrower_than_its_service_source() {
        use crate::engine::config::{Rule, RuleLevel};
        let manifest = Manifest {
            service: crate::engine::config::ConfigurationObject::default(),
            rules: vec![Rule {
                level: RuleLevel::Application,
                uuid: None,
                name: None,
                config: crate::engine::config::ConfigurationObject::default(),
            }],
        };
        // Every manifest rule is attached to Scope::Service (the broadest
        // level), which any RuleLevel narrows from — always valid.
        assert!(validate_against_store(&manifest).is_ok());
    }
}
