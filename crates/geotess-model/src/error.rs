//! Model errors.

use geotess_geometry::GeometryError;
use geotess_grid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("vertex {vertex} out of range (model has {n_vertices} vertices)")]
    VertexOutOfRange { vertex: u32, n_vertices: usize },

    #[error("layer {layer} out of range (model has {n_layers} layers)")]
    LayerOutOfRange { layer: usize, n_layers: usize },

    /// A layer is bound to a tessellation the grid does not have.
    #[error("layer {layer} maps to tessellation {tessellation}, but the grid has {n_tessellations}")]
    LayerTessellationOutOfRange {
        layer: usize,
        tessellation: usize,
        n_tessellations: usize,
    },

    /// Profile radii must be finite and strictly increasing.
    #[error("profile radii are not strictly increasing: {0:?}")]
    NotIncreasing(Vec<f32>),

    /// The number of data nodes does not fit the number of radii.
    #[error("profile with {radii} radii cannot carry {data} data nodes")]
    DataCountMismatch { radii: usize, data: usize },

    /// A data node has the wrong number of attribute values.
    #[error("data node has {found} attribute values, model defines {expected}")]
    AttributeCountMismatch { expected: usize, found: usize },

    #[error("non-finite value in profile {0}")]
    NonFinite(&'static str),

    /// The model metadata is inconsistent.
    #[error("invalid metadata: {0}")]
    MetaData(String),

    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    /// Stored profiles do not match the grid / layer dimensions.
    #[error("inconsistent model dimensions: {0}")]
    Dimensions(String),

    /// Profiles changed since the active region was last set.
    #[error("point map is stale: call set_active_region after modifying profiles")]
    StalePointMap,

    #[error("point index {index} out of range (point map has {len} points)")]
    PointIndexOutOfRange { index: usize, len: usize },
}
