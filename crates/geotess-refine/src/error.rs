//! Refinement errors.

use geotess_grid::GridError;
use geotess_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum RefineError {
    /// A requested point index is not in the model's point map.
    #[error("point index {index} out of range (point map has {len} points)")]
    InvalidPointIndex { index: usize, len: usize },

    /// A threshold names an attribute the model does not define.
    #[error("threshold refers to unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("malformed threshold '{0}': expected '<attribute> <op> <value>'")]
    BadThreshold(String),

    /// Both explicit points and a threshold were requested.
    #[error("pointsToRefine and threshold are mutually exclusive")]
    ContradictoryTriggers,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Grid(#[from] GridError),
}
