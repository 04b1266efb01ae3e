//! Driver errors and their reporting kinds.

use std::fmt;
use std::path::PathBuf;

use geotess_config::ConfigError;
use geotess_geometry::GeometryError;
use geotess_grid::GridError;
use geotess_model::ModelError;
use geotess_refine::RefineError;

/// Reporting kind of a failed run; each maps to a distinct exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Geometry,
    RefinementTarget,
    Invariant,
    Io,
}

impl ErrorKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Geometry => "geometry",
            ErrorKind::RefinementTarget => "refinement-target",
            ErrorKind::Invariant => "invariant",
            ErrorKind::Io => "io",
        }
    }

    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Geometry => 3,
            ErrorKind::RefinementTarget => 4,
            ErrorKind::Invariant => 5,
            ErrorKind::Io => 6,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Refine(#[from] RefineError),

    /// `model refinement` was requested without an input model.
    #[error("model refinement needs an input model")]
    MissingModel,

    #[error("cannot read polygon file {path}: {reason}")]
    PolygonFile { path: PathBuf, reason: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn grid_kind(e: &GridError) -> ErrorKind {
    match e {
        GridError::EmptyTessellations
        | GridError::InvalidEdgeLength { .. }
        | GridError::PolygonTessellationOutOfRange { .. }
        | GridError::UnknownSolid(_) => ErrorKind::Configuration,
        GridError::Geometry(_) => ErrorKind::Geometry,
        GridError::Io(_)
        | GridError::BadMagic
        | GridError::VersionTooNew { .. }
        | GridError::Serialization(_)
        | GridError::IdMismatch { .. } => ErrorKind::Io,
        GridError::TessellationOutOfRange { .. }
        | GridError::MalformedTessellation(_)
        | GridError::InvalidVertexIndex { .. }
        | GridError::NonConforming { .. } => ErrorKind::Invariant,
    }
}

fn model_kind(e: &ModelError) -> ErrorKind {
    match e {
        ModelError::Grid(g) => grid_kind(g),
        ModelError::Geometry(_) => ErrorKind::Geometry,
        ModelError::PointIndexOutOfRange { .. } => ErrorKind::RefinementTarget,
        _ => ErrorKind::Invariant,
    }
}

impl BuildError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Config(ConfigError::ReadError(_) | ConfigError::WriteError(_)) => {
                ErrorKind::Io
            }
            BuildError::Config(_) | BuildError::MissingModel | BuildError::PolygonFile { .. } => {
                ErrorKind::Configuration
            }
            BuildError::Geometry(_) => ErrorKind::Geometry,
            BuildError::Grid(e) => grid_kind(e),
            BuildError::Model(e) => model_kind(e),
            BuildError::Refine(e) => match e {
                RefineError::InvalidPointIndex { .. } | RefineError::UnknownAttribute(_) => {
                    ErrorKind::RefinementTarget
                }
                RefineError::BadThreshold(_) | RefineError::ContradictoryTriggers => {
                    ErrorKind::Configuration
                }
                RefineError::Model(m) => model_kind(m),
                RefineError::Grid(g) => grid_kind(g),
            },
            BuildError::Write { .. } => ErrorKind::Io,
        }
    }

    /// Identifying tag printed with the message.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.kind().tag()
    }

    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_codes() {
        let e = BuildError::from(RefineError::InvalidPointIndex { index: 9, len: 3 });
        assert_eq!(e.tag(), "refinement-target");
        assert_eq!(e.exit_code(), 4);

        let e = BuildError::from(ConfigError::MissingKey("nTessellations".into()));
        assert_eq!(e.tag(), "configuration");
        assert_eq!(e.exit_code(), 2);

        let e = BuildError::from(GridError::Geometry(GeometryError::ZeroVector));
        assert_eq!(e.tag(), "geometry");

        let e = BuildError::from(ModelError::NotIncreasing(vec![2.0, 1.0]));
        assert_eq!(e.tag(), "invariant");
        assert_eq!(e.exit_code(), 5);

        let e = BuildError::from(RefineError::Model(ModelError::Grid(GridError::BadMagic)));
        assert_eq!(e.tag(), "io");
        assert_eq!(e.exit_code(), 6);
    }

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::Configuration,
            ErrorKind::Geometry,
            ErrorKind::RefinementTarget,
            ErrorKind::Invariant,
            ErrorKind::Io,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|&c| c != 0));
    }
}
