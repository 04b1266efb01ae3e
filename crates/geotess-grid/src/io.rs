//! Grid persistence: postcard-encoded, lz4-compressed, framed by a magic
//! number and format version.
//!
//! ```text
//! [magic: 4 bytes][version: u32 LE][lz4 size-prepended postcard payload]
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use geotess_geometry::{EulerRotation, UnitVector};

use crate::{Grid, GridError, GridId, PlatonicSolid, Tessellation};

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Current on-disk format version.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Magic number of grid files.
pub const GRID_MAGIC: [u8; 4] = *b"GTGR";

/// Serialize `value` into a framed, compressed buffer.
///
/// # Errors
///
/// [`GridError::Serialization`] when postcard rejects the value.
pub fn frame<T: Serialize>(magic: [u8; 4], value: &T) -> Result<Vec<u8>, GridError> {
    let bytes = postcard::to_allocvec(value).map_err(|e| GridError::Serialization(e.to_string()))?;
    let compressed = lz4_flex::compress_prepend_size(&bytes);
    let mut out = Vec::with_capacity(8 + compressed.len());
    out.extend_from_slice(&magic);
    out.extend_from_slice(&CURRENT_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Inverse of [`frame`].
///
/// # Errors
///
/// [`GridError::BadMagic`], [`GridError::VersionTooNew`], or
/// [`GridError::Serialization`] for corrupt payloads.
pub fn unframe<T: DeserializeOwned>(magic: [u8; 4], buf: &[u8]) -> Result<T, GridError> {
    if buf.len() < 8 || buf[..4] != magic {
        return Err(GridError::BadMagic);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&buf[4..8]);
    let version = u32::from_le_bytes(version);
    if version > CURRENT_FORMAT_VERSION {
        return Err(GridError::VersionTooNew {
            found: version,
            max_supported: CURRENT_FORMAT_VERSION,
        });
    }
    let bytes = lz4_flex::decompress_size_prepended(&buf[8..])
        .map_err(|e| GridError::Serialization(e.to_string()))?;
    postcard::from_bytes(&bytes).map_err(|e| GridError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Grid records
// ---------------------------------------------------------------------------

/// The serialized form of a [`Grid`]. Derived data (top-level vertex sets)
/// is rebuilt on load and the stored ID is verified.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GridRecord {
    pub id: GridId,
    pub solid: PlatonicSolid,
    pub vertices: Vec<UnitVector>,
    pub tessellations: Vec<Tessellation>,
    pub rotation: Option<EulerRotation>,
}

impl From<&Grid> for GridRecord {
    fn from(grid: &Grid) -> Self {
        Self {
            id: grid.id(),
            solid: grid.solid(),
            vertices: grid.vertices().to_vec(),
            tessellations: grid.tessellations().to_vec(),
            rotation: grid.rotation(),
        }
    }
}

impl GridRecord {
    /// Rebuild the grid.
    ///
    /// # Errors
    ///
    /// [`GridError::IdMismatch`] when the contents do not hash to the stored
    /// ID, plus any [`Grid::from_parts`] validation failure.
    pub fn into_grid(self) -> Result<Grid, GridError> {
        let stored = self.id;
        let grid = Grid::from_parts(self.solid, self.vertices, self.tessellations, self.rotation)?;
        if grid.id() != stored {
            return Err(GridError::IdMismatch {
                stored: stored.to_string(),
                computed: grid.id().to_string(),
            });
        }
        Ok(grid)
    }
}

// ---------------------------------------------------------------------------
// Write / Load
// ---------------------------------------------------------------------------

/// # Errors
///
/// See [`frame`].
pub fn encode_grid(grid: &Grid) -> Result<Vec<u8>, GridError> {
    frame(GRID_MAGIC, &GridRecord::from(grid))
}

/// # Errors
///
/// See [`unframe`] and [`GridRecord::into_grid`].
pub fn decode_grid(buf: &[u8]) -> Result<Grid, GridError> {
    unframe::<GridRecord>(GRID_MAGIC, buf)?.into_grid()
}

/// Write a grid file, creating parent directories.
///
/// # Errors
///
/// I/O or serialization failure.
pub fn write_grid(grid: &Grid, path: &Path) -> Result<(), GridError> {
    let buf = encode_grid(grid)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, buf)?;
    tracing::debug!(path = %path.display(), id = %grid.id(), "grid written");
    Ok(())
}

/// # Errors
///
/// I/O, decompression, deserialization, version, or ID failure.
pub fn read_grid(path: &Path) -> Result<Grid, GridError> {
    let buf = std::fs::read(path)?;
    decode_grid(&buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
