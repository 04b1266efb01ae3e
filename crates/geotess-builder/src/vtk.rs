//! Legacy ASCII VTK polydata of tessellation top levels.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use geotess_grid::Grid;
use geotess_model::Model;
use tracing::debug;

use crate::BuildError;

/// A named per-point scalar field, one value per top-level vertex.
pub type PointField = (String, Vec<f64>);

/// Render the top level of tessellation `t` as VTK polydata.
///
/// Points are the top-level vertices in ascending grid index order, so point
/// `i` of the file is `grid.top_level_vertices(t)[i]`.
///
/// # Errors
///
/// Unknown tessellation.
pub fn tessellation_vtk(grid: &Grid, t: usize, fields: &[PointField]) -> Result<String, BuildError> {
    let triangles = grid.top_level(t)?;
    let vertices = grid.top_level_vertices(t);
    let local = |v: u32| vertices.binary_search(&v).unwrap_or_default();

    let mut out = String::new();
    // Writes into a String cannot fail.
    let _ = writeln!(out, "# vtk DataFile Version 3.0");
    let _ = writeln!(out, "grid {} tessellation {t}", grid.id());
    let _ = writeln!(out, "ASCII\nDATASET POLYDATA");
    let _ = writeln!(out, "POINTS {} double", vertices.len());
    for &v in vertices {
        let p = grid.vertex(v);
        let _ = writeln!(out, "{:.15} {:.15} {:.15}", p.x(), p.y(), p.z());
    }
    let _ = writeln!(out, "POLYGONS {} {}", triangles.len(), 4 * triangles.len());
    for tri in triangles {
        let [a, b, c] = tri.vertices.map(local);
        let _ = writeln!(out, "3 {a} {b} {c}");
    }
    if !fields.is_empty() {
        let _ = writeln!(out, "POINT_DATA {}", vertices.len());
        for (name, values) in fields {
            let _ = writeln!(out, "SCALARS {} double 1\nLOOKUP_TABLE default", name.replace(' ', "_"));
            for value in values {
                let _ = writeln!(out, "{value}");
            }
        }
    }
    Ok(out)
}

fn write_file(path: &Path, text: &str) -> Result<(), BuildError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)
    };
    write().map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "vtk written");
    Ok(())
}

/// `path` with `_<t>` inserted before the extension.
fn with_suffix(path: &Path, t: usize) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{t}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{t}"),
    };
    path.with_file_name(name)
}

/// Write every tessellation of `grid` to `path`. A grid with several
/// tessellations gets one file per tessellation, suffixed `_<t>`.
///
/// # Errors
///
/// Write failures.
pub fn write_grid_vtk(grid: &Grid, path: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let n = grid.n_tessellations();
    let mut written = Vec::with_capacity(n);
    for t in 0..n {
        let target = if n == 1 {
            path.to_path_buf()
        } else {
            with_suffix(path, t)
        };
        write_file(&target, &tessellation_vtk(grid, t, &[])?)?;
        written.push(target);
    }
    Ok(written)
}

/// Node counts of every layer bound to tessellation `t`, one field per
/// layer.
fn node_count_fields(model: &Model, t: usize) -> Result<Vec<PointField>, BuildError> {
    let vertices = model.grid().top_level_vertices(t);
    let md = model.metadata();
    md.layers_of(t)
        .into_iter()
        .map(|layer| {
            let counts = vertices
                .iter()
                .map(|&v| Ok(model.profile(v, layer)?.n_data() as f64))
                .collect::<Result<Vec<f64>, BuildError>>()?;
            Ok((format!("nodes_{}", md.layer_names()[layer]), counts))
        })
        .collect()
}

/// Write `<dir>/<prefix>_<t>.vtk` for each tessellation of `model`, with the
/// per-layer node counts as point data.
///
/// # Errors
///
/// Write failures.
pub fn write_model_vtk(model: &Model, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, BuildError> {
    (0..model.grid().n_tessellations())
        .map(|t| {
            let fields = node_count_fields(model, t)?;
            let path = dir.join(format!("{prefix}_{t}.vtk"));
            write_file(&path, &tessellation_vtk(model.grid(), t, &fields)?)?;
            Ok(path)
        })
        .collect()
}
