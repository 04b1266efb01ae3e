//! Geometry error types.

/// Errors raised while constructing geometric primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A coordinate or angle was NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// A vector of (near) zero length cannot be normalised.
    #[error("cannot normalise a zero-length vector")]
    ZeroVector,

    /// A polygon could not be built from the supplied vertices.
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// A small-circle radius outside (0, 180] degrees.
    #[error("invalid small circle radius {0} degrees")]
    InvalidRadius(f64),
}
