//! Grid builder driver.
//!
//! Turns a property bag into either a freshly built [`Grid`] (`scratch`
//! mode) or a refined [`Model`] (`model refinement` mode), writing the
//! requested grid, model and VTK outputs along the way.

pub mod error;
pub mod polygons;
pub mod vtk;

use geotess_config::{BuilderConfig, ConfigError, ConstructionMode, Properties, RotationSpec};
use geotess_geometry::{EarthShape, EulerRotation};
use geotess_grid::{Grid, GridBuilder, GridOptions};
use geotess_model::Model;
use geotess_refine::{RefineReport, RefinementTrigger, Threshold, refine_with_report};
use tracing::info;

pub use error::{BuildError, ErrorKind};

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutput {
    Grid(Grid),
    Model(Model),
}

impl BuildOutput {
    /// The grid of the output.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        match self {
            BuildOutput::Grid(grid) => grid,
            BuildOutput::Model(model) => model.grid(),
        }
    }
}

/// Interpret `props` and run the requested construction.
///
/// # Errors
///
/// Configuration, geometry, refinement and output failures, see
/// [`BuildError::kind`].
pub fn run(props: &Properties, model: Option<&Model>) -> Result<BuildOutput, BuildError> {
    let config = BuilderConfig::from_properties(props)?;
    run_config(&config, model)
}

/// Run an already validated configuration.
///
/// # Errors
///
/// See [`run`].
pub fn run_config(config: &BuilderConfig, model: Option<&Model>) -> Result<BuildOutput, BuildError> {
    match config.mode {
        ConstructionMode::Scratch => build_grid(config).map(BuildOutput::Grid),
        ConstructionMode::ModelRefinement => {
            let model = model.ok_or(BuildError::MissingModel)?;
            refine_model(config, model).map(|(model, _)| BuildOutput::Model(model))
        }
    }
}

/// Geodetic latitudes in properties are interpreted on this ellipsoid.
const GEODETIC_SHAPE: EarthShape = EarthShape::Wgs84;

fn rotation(spec: Option<RotationSpec>) -> Result<Option<EulerRotation>, BuildError> {
    let rotation = match spec {
        None => None,
        Some(RotationSpec::PoleAt { lat, lon }) => {
            Some(EulerRotation::placing_pole_at(lat, lon, GEODETIC_SHAPE)?)
        }
        Some(RotationSpec::Euler { alpha, beta, gamma }) => {
            Some(EulerRotation::new(alpha, beta, gamma)?)
        }
    };
    Ok(rotation)
}

/// Build a grid from a `scratch` configuration and write its outputs.
///
/// # Errors
///
/// See [`run`].
pub fn build_grid(config: &BuilderConfig) -> Result<Grid, BuildError> {
    let options = GridOptions {
        solid: config.initial_solid,
        base_edge_lengths: config.base_edge_lengths.clone(),
        polygons: polygons::polygon_refinements(&config.polygons, GEODETIC_SHAPE)?,
        rotation: rotation(config.rotation)?,
    };
    let grid = GridBuilder::new(options)?.build()?;
    info!(
        id = %grid.id(),
        solid = %grid.solid(),
        tessellations = grid.n_tessellations(),
        vertices = grid.n_vertices(),
        "grid built"
    );

    if let Some(path) = &config.output_model_file {
        geotess_grid::io::write_grid(&grid, path)?;
        info!(path = %path.display(), "grid file written");
    }
    if let Some(path) = &config.vtk_file {
        vtk::write_grid_vtk(&grid, path)?;
    }
    Ok(grid)
}

/// The refinement trigger of a `model refinement` configuration.
///
/// # Errors
///
/// A malformed threshold, or both or neither trigger given.
pub fn trigger(config: &BuilderConfig) -> Result<RefinementTrigger, BuildError> {
    let threshold = config
        .threshold
        .as_deref()
        .map(str::parse::<Threshold>)
        .transpose()?;
    // A deserialized config has not been through the property checks.
    RefinementTrigger::from_options(config.points_to_refine.clone(), threshold)?.ok_or_else(|| {
        BuildError::Config(ConfigError::MissingKey("pointsToRefine or threshold".to_string()))
    })
}

/// Refine `model` per a `model refinement` configuration and write its
/// outputs. With `vtkDir` set, the original and refined top levels are
/// written as `original_<t>.vtk` and `refined_<t>.vtk`.
///
/// # Errors
///
/// See [`run`].
pub fn refine_model(
    config: &BuilderConfig,
    model: &Model,
) -> Result<(Model, RefineReport), BuildError> {
    let (refined, report) = refine_with_report(model, &trigger(config)?)?;
    info!(
        seeds = report.seeds,
        vertices_added = report.vertices_added,
        radial_splits = report.radial_splits,
        points = refined.point_map()?.len(),
        "model refined"
    );

    if let Some(path) = &config.output_model_file {
        geotess_model::io::write_model(&refined, path)?;
        info!(path = %path.display(), "model file written");
    }
    if let Some(dir) = &config.vtk_dir {
        vtk::write_model_vtk(model, dir, "original")?;
        vtk::write_model_vtk(&refined, dir, "refined")?;
    }
    Ok((refined, report))
}
