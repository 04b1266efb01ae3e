//! Command-line argument parsing for the grid builder.

use std::path::PathBuf;

use clap::Parser;

use crate::{BuilderConfig, ConfigError, Properties};

/// Grid builder command-line arguments.
///
/// CLI values override properties loaded from the configuration file.
#[derive(Parser, Debug)]
#[command(
    name = "geotess-builder",
    about = "Build multi-tessellation geodesic grids and refine models"
)]
pub struct CliArgs {
    /// Property file (`key = value` lines) or a `.ron` builder config.
    pub config: PathBuf,

    /// Input model for `model refinement` runs.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Verbosity (0 warn, 1 info, 2 debug, 3 trace).
    #[arg(long)]
    pub verbosity: Option<u8>,

    /// Directory for JSON log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Property override, repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl CliArgs {
    /// Load the configuration file and apply overrides.
    ///
    /// # Errors
    ///
    /// Read or parse failures and malformed `--set` values.
    pub fn load_properties(&self) -> Result<Properties, ConfigError> {
        let is_ron = self
            .config
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        let mut props = if is_ron {
            BuilderConfig::load_ron(&self.config)?.to_properties()
        } else {
            Properties::load(&self.config)?
        };
        props.apply_cli_overrides(self)?;
        Ok(props)
    }
}

impl Properties {
    /// Apply CLI overrides to loaded properties.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedLine`] for a `--set` value without `=`.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        for line in &args.overrides {
            self.set_line(line)?;
        }
        if let Some(v) = args.verbosity {
            self.set("verbosity", v);
        }
        Ok(())
    }
}
