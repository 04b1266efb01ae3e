//! Grid construction and persistence errors.

use geotess_geometry::GeometryError;

/// Errors raised while building, validating, or loading a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// No tessellations were requested.
    #[error("the list of tessellations is empty")]
    EmptyTessellations,

    /// A base or polygon target edge length is not a positive finite number.
    #[error("tessellation {tessellation}: edge length {value} degrees must be > 0")]
    InvalidEdgeLength { tessellation: usize, value: f64 },

    /// A polygon refers to a tessellation that does not exist.
    #[error("polygon refers to tessellation {tessellation}, but only {n_tessellations} exist")]
    PolygonTessellationOutOfRange {
        tessellation: usize,
        n_tessellations: usize,
    },

    /// A tessellation index outside the grid.
    #[error("tessellation {tessellation} out of range (grid has {n_tessellations})")]
    TessellationOutOfRange {
        tessellation: usize,
        n_tessellations: usize,
    },

    /// A tessellation has no levels or a level outside its triangle arena.
    #[error("tessellation {0} is malformed")]
    MalformedTessellation(usize),

    /// The seed solid name is not one of the supported Platonic solids.
    #[error("unknown initial solid '{0}'")]
    UnknownSolid(String),

    /// A triangle references a vertex that does not exist.
    #[error("triangle references vertex {index}, but the grid has {n_vertices} vertices")]
    InvalidVertexIndex { index: u32, n_vertices: usize },

    /// A tessellation level is not a conforming covering of the sphere.
    #[error("tessellation {tessellation}, level {level}: edge ({a}, {b}) is shared by {count} triangles")]
    NonConforming {
        tessellation: usize,
        level: usize,
        a: u32,
        b: u32,
        count: usize,
    },

    /// A geometric primitive could not be constructed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The stored grid ID does not match the one recomputed on load.
    #[error("grid ID mismatch: file says {stored}, contents hash to {computed}")]
    IdMismatch { stored: String, computed: String },

    /// Not a grid file.
    #[error("bad magic number: not a grid file")]
    BadMagic,

    /// File format version is newer than supported.
    #[error("grid format version {found} is newer than max supported {max_supported}")]
    VersionTooNew { found: u32, max_supported: u32 },

    /// I/O error reading or writing grid files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
