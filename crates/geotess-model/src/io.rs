//! Model persistence in the grid crate's framed postcard + lz4 format.

use std::path::Path;

use serde::{Deserialize, Serialize};

use geotess_grid::io::{GridRecord, frame, unframe};

use crate::{MetaData, Model, ModelError, Polygon3D, Profile};

/// Magic number of model files.
pub const MODEL_MAGIC: [u8; 4] = *b"GTMD";

#[derive(Serialize, Deserialize)]
struct ModelRecord {
    grid: GridRecord,
    metadata: MetaData,
    profiles: Vec<Vec<Profile>>,
    active_region: Option<Polygon3D>,
}

/// # Errors
///
/// Serialization failure.
pub fn encode_model(model: &Model) -> Result<Vec<u8>, ModelError> {
    let record = ModelRecord {
        grid: GridRecord::from(model.grid()),
        metadata: model.metadata().clone(),
        profiles: model.profiles().to_vec(),
        active_region: model.active_region().cloned(),
    };
    Ok(frame(MODEL_MAGIC, &record)?)
}

/// Decode a model; the grid ID is verified and the point map rebuilt.
///
/// # Errors
///
/// Framing, ID, or model validation failure.
pub fn decode_model(buf: &[u8]) -> Result<Model, ModelError> {
    let record: ModelRecord = unframe(MODEL_MAGIC, buf)?;
    let grid = record.grid.into_grid()?;
    Model::from_parts(grid, record.metadata, record.profiles, record.active_region)
}

/// Write a model file, creating parent directories.
///
/// # Errors
///
/// I/O or serialization failure.
pub fn write_model(model: &Model, path: &Path) -> Result<(), ModelError> {
    let buf = encode_model(model)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(geotess_grid::GridError::from)?;
    }
    std::fs::write(path, buf).map_err(geotess_grid::GridError::from)?;
    tracing::debug!(path = %path.display(), "model written");
    Ok(())
}

/// # Errors
///
/// I/O or decoding failure.
pub fn read_model(path: &Path) -> Result<Model, ModelError> {
    let buf = std::fs::read(path).map_err(geotess_grid::GridError::from)?;
    decode_model(&buf)
}
