//! Typed builder configuration with RON persistence.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use geotess_grid::PlatonicSolid;

use crate::error::ConfigError;
use crate::polygon_spec::{PolygonSpec, parse_polygon_list};
use crate::Properties;

/// What a run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionMode {
    /// Build a new grid.
    #[default]
    Scratch,
    /// Refine an existing model.
    ModelRefinement,
}

impl fmt::Display for ConstructionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstructionMode::Scratch => "scratch",
            ConstructionMode::ModelRefinement => "model refinement",
        })
    }
}

impl FromStr for ConstructionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["scratch"] => Ok(ConstructionMode::Scratch),
            ["model", "refinement"] => Ok(ConstructionMode::ModelRefinement),
            _ => Err("expected 'scratch' or 'model refinement'".to_string()),
        }
    }
}

/// Grid rotation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RotationSpec {
    /// Place vertex 0 at geodetic `(lat, lon)` degrees.
    PoleAt { lat: f64, lon: f64 },
    /// Raw Euler angles in degrees.
    Euler { alpha: f64, beta: f64, gamma: f64 },
}

/// Validated view of a builder property bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuilderConfig {
    pub mode: ConstructionMode,
    pub initial_solid: PlatonicSolid,
    /// One value per tessellation, in degrees.
    pub base_edge_lengths: Vec<f64>,
    pub polygons: Vec<PolygonSpec>,
    pub rotation: Option<RotationSpec>,
    /// Point-map indices to refine (refinement mode).
    pub points_to_refine: Option<Vec<usize>>,
    /// `<attribute> <op> <value>` predicate (refinement mode).
    pub threshold: Option<String>,
    pub output_model_file: Option<PathBuf>,
    pub vtk_file: Option<PathBuf>,
    pub vtk_dir: Option<PathBuf>,
    pub verbosity: u8,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            mode: ConstructionMode::Scratch,
            initial_solid: PlatonicSolid::Icosahedron,
            base_edge_lengths: vec![64.0],
            polygons: Vec::new(),
            rotation: None,
            points_to_refine: None,
            threshold: None,
            output_model_file: None,
            vtk_file: None,
            vtk_dir: None,
            verbosity: 0,
        }
    }
}

// --- Property keys ---

const MODE: &str = "gridConstructionMode";
const SOLID: &str = "initialSolid";
const N_TESSELLATIONS: &str = "nTessellations";
const BASE_EDGE_LENGTHS: &str = "baseEdgeLengths";
const POLYGONS: &str = "polygons";
const ROTATE_GRID: &str = "rotateGrid";
const EULER_ANGLES: &str = "eulerRotationAngles";
const POINTS_TO_REFINE: &str = "pointsToRefine";
const THRESHOLD: &str = "threshold";
const OUTPUT_MODEL_FILE: &str = "outputModelFile";
const VTK_FILE: &str = "vtkFile";
const VTK_DIR: &str = "vtkDir";
const VERBOSITY: &str = "verbosity";

fn fixed_list<const N: usize>(props: &Properties, key: &str) -> Result<Option<[f64; N]>, ConfigError> {
    let Some(values) = props.get_f64_list(key)? else {
        return Ok(None);
    };
    let array: [f64; N] = values.try_into().map_err(|_| {
        ConfigError::invalid(
            key,
            props.get(key).unwrap_or_default(),
            format!("expected {N} numbers"),
        )
    })?;
    Ok(Some(array))
}

impl BuilderConfig {
    /// Interpret a property bag. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Missing required keys, unparseable values, and conflicting options.
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let mode_str = props.require(MODE)?;
        let mode: ConstructionMode = mode_str
            .parse()
            .map_err(|e: String| ConfigError::invalid(MODE, mode_str, e))?;
        let mut config = Self {
            mode,
            verbosity: props.get_parsed(VERBOSITY)?.unwrap_or(0),
            output_model_file: props.get(OUTPUT_MODEL_FILE).map(PathBuf::from),
            vtk_file: props.get(VTK_FILE).map(PathBuf::from),
            vtk_dir: props.get(VTK_DIR).map(PathBuf::from),
            ..Self::default()
        };

        match mode {
            ConstructionMode::Scratch => config.read_scratch(props)?,
            ConstructionMode::ModelRefinement => config.read_refinement(props)?,
        }
        Ok(config)
    }

    fn read_scratch(&mut self, props: &Properties) -> Result<(), ConfigError> {
        if let Some(solid) = props.get(SOLID) {
            self.initial_solid = solid
                .parse()
                .map_err(|e: geotess_grid::GridError| ConfigError::invalid(SOLID, solid, e.to_string()))?;
        }

        let n = props
            .get_usize(N_TESSELLATIONS)?
            .ok_or_else(|| ConfigError::MissingKey(N_TESSELLATIONS.to_string()))?;
        if n == 0 {
            return Err(ConfigError::invalid(
                N_TESSELLATIONS,
                props.get(N_TESSELLATIONS).unwrap_or_default(),
                "must be positive",
            ));
        }
        let edges = props
            .get_f64_list(BASE_EDGE_LENGTHS)?
            .ok_or_else(|| ConfigError::MissingKey(BASE_EDGE_LENGTHS.to_string()))?;
        if edges.len() != n {
            return Err(ConfigError::invalid(
                BASE_EDGE_LENGTHS,
                props.get(BASE_EDGE_LENGTHS).unwrap_or_default(),
                format!("expected {n} values, one per tessellation"),
            ));
        }
        self.base_edge_lengths = edges;

        if let Some(value) = props.get(POLYGONS) {
            self.polygons = parse_polygon_list(value)?;
        }

        self.rotation = match (
            fixed_list::<2>(props, ROTATE_GRID)?,
            fixed_list::<3>(props, EULER_ANGLES)?,
        ) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingKeys(ROTATE_GRID, EULER_ANGLES)),
            (Some([lat, lon]), None) => Some(RotationSpec::PoleAt { lat, lon }),
            (None, Some([alpha, beta, gamma])) => Some(RotationSpec::Euler { alpha, beta, gamma }),
            (None, None) => None,
        };
        Ok(())
    }

    fn read_refinement(&mut self, props: &Properties) -> Result<(), ConfigError> {
        self.points_to_refine = props.get_list(POINTS_TO_REFINE)?;
        self.threshold = props.get(THRESHOLD).map(str::to_string);
        match (&self.points_to_refine, &self.threshold) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingKeys(POINTS_TO_REFINE, THRESHOLD)),
            (None, None) => Err(ConfigError::MissingKey(format!(
                "{POINTS_TO_REFINE} or {THRESHOLD}"
            ))),
            _ => Ok(()),
        }
    }

    /// The property bag this configuration was read from, up to formatting.
    #[must_use]
    pub fn to_properties(&self) -> Properties {
        let mut props = Properties::new();
        props.set(MODE, self.mode);
        props.set(VERBOSITY, self.verbosity);
        match self.mode {
            ConstructionMode::Scratch => {
                props.set(SOLID, self.initial_solid);
                props.set(N_TESSELLATIONS, self.base_edge_lengths.len());
                props.set(BASE_EDGE_LENGTHS, join(&self.base_edge_lengths, ", "));
                if !self.polygons.is_empty() {
                    props.set(POLYGONS, join(&self.polygons, "; "));
                }
                match self.rotation {
                    Some(RotationSpec::PoleAt { lat, lon }) => props.set(ROTATE_GRID, format!("{lat} {lon}")),
                    Some(RotationSpec::Euler { alpha, beta, gamma }) => {
                        props.set(EULER_ANGLES, format!("{alpha} {beta} {gamma}"));
                    }
                    None => {}
                }
            }
            ConstructionMode::ModelRefinement => {
                if let Some(points) = &self.points_to_refine {
                    props.set(POINTS_TO_REFINE, join(points, ", "));
                }
                if let Some(threshold) = &self.threshold {
                    props.set(THRESHOLD, threshold);
                }
            }
        }
        for (key, path) in [
            (OUTPUT_MODEL_FILE, &self.output_model_file),
            (VTK_FILE, &self.vtk_file),
            (VTK_DIR, &self.vtk_dir),
        ] {
            if let Some(path) = path {
                props.set(key, path.display());
            }
        }
        props
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

// --- Load / Save ---

impl BuilderConfig {
    /// Load a configuration saved with [`BuilderConfig::save_ron`].
    ///
    /// # Errors
    ///
    /// I/O or RON parse failure.
    pub fn load_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: BuilderConfig = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        log::info!("Loaded builder config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty RON, creating parent directories.
    ///
    /// # Errors
    ///
    /// I/O or serialization failure.
    pub fn save_ron(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
