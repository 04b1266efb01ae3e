//! Configuration for the grid builder.
//!
//! Runs are described by a flat `key = value` [`Properties`] bag. A typed,
//! validated [`BuilderConfig`] view is derived from it and can be persisted
//! as RON. [`CliArgs`] loads either form and applies command-line overrides.

mod cli;
mod config;
mod error;
mod polygon_spec;
mod properties;

pub use cli::CliArgs;
pub use config::{BuilderConfig, ConstructionMode, RotationSpec};
pub use error::ConfigError;
pub use polygon_spec::{PolygonSource, PolygonSpec, parse_polygon_list};
pub use properties::Properties;
