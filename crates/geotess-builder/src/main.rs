//! Command-line entry point for the grid builder.
//!
//! Run with: `cargo run -p geotess-builder -- build.properties`

use std::process::ExitCode;

use clap::Parser;
use geotess_builder::{BuildError, BuildOutput, run_config};
use geotess_config::{BuilderConfig, CliArgs};
use tracing::{error, info};

fn execute(args: &CliArgs) -> Result<BuildOutput, BuildError> {
    let props = args.load_properties()?;
    let config = BuilderConfig::from_properties(&props)?;

    geotess_log::init_logging(args.log_dir.as_deref(), Some(&config));
    info!(config = %args.config.display(), mode = %config.mode, "geotess builder");

    let model = args
        .model
        .as_deref()
        .map(geotess_model::io::read_model)
        .transpose()?;
    run_config(&config, model.as_ref())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match execute(&args) {
        Ok(output) => {
            let grid = output.grid();
            println!("{}", grid.id());
            info!(
                id = %grid.id(),
                vertices = grid.n_vertices(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = %e.kind(), "{e}");
            eprintln!("error[{}]: {e}", e.tag());
            ExitCode::from(e.exit_code())
        }
    }
}
