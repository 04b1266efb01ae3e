//! Polygon sources for local refinement: spherical caps, KML files and
//! plain `lat lon` text files.

use std::path::Path;

use geotess_config::{PolygonSource, PolygonSpec};
use geotess_geometry::{EarthShape, Polygon};
use geotess_grid::PolygonRefinement;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use crate::BuildError;

fn file_error(path: &Path, reason: impl Into<String>) -> BuildError {
    BuildError::PolygonFile {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// `(lat, lon)` pairs from every `<coordinates>` element of a KML document.
///
/// KML tuples are `lon,lat[,alt]` separated by whitespace; the rings of all
/// placemarks are concatenated, so a file should describe one polygon.
pub fn parse_kml(text: &str) -> Result<Vec<(f64, f64)>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut points = Vec::new();
    let mut in_coordinates = false;
    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ));
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"coordinates" => {
                in_coordinates = true;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"coordinates" => {
                in_coordinates = false;
            }
            Ok(Event::Text(t)) if in_coordinates => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                for tuple in text.split_whitespace() {
                    let mut fields = tuple.split(',');
                    let lon = fields.next().and_then(|s| s.parse::<f64>().ok());
                    let lat = fields.next().and_then(|s| s.parse::<f64>().ok());
                    match (lat, lon) {
                        (Some(lat), Some(lon)) => points.push((lat, lon)),
                        _ => return Err(format!("bad coordinate tuple '{tuple}'")),
                    }
                }
            }
            _ => {}
        }
    }
    if points.is_empty() {
        return Err("no <coordinates> found".into());
    }
    Ok(points)
}

/// `(lat, lon)` pairs from text with one `lat lon` pair per line.
///
/// Fields may be separated by whitespace or commas. Blank lines and `#`
/// comments are skipped.
pub fn parse_lat_lon_text(text: &str) -> Result<Vec<(f64, f64)>, String> {
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<f64> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| format!("line {}: {e}", i + 1))?;
        match fields[..] {
            [lat, lon] => points.push((lat, lon)),
            _ => return Err(format!("line {}: expected 'lat lon'", i + 1)),
        }
    }
    Ok(points)
}

/// Read a polygon file. `.kml` files are parsed as KML, anything else as
/// `lat lon` text.
///
/// # Errors
///
/// [`BuildError::PolygonFile`] when the file cannot be read or parsed, and
/// geometry errors for degenerate polygons.
pub fn load_polygon_file(path: &Path, shape: EarthShape) -> Result<Polygon, BuildError> {
    let text = std::fs::read_to_string(path).map_err(|e| file_error(path, e.to_string()))?;
    let is_kml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("kml"));
    let points = if is_kml {
        parse_kml(&text)
    } else {
        parse_lat_lon_text(&text)
    }
    .map_err(|reason| file_error(path, reason))?;
    debug!(path = %path.display(), n_points = points.len(), "loaded polygon");
    Ok(Polygon::from_lat_lon_degrees(&points, shape)?)
}

/// Resolve polygon specs into builder refinements.
///
/// # Errors
///
/// Unreadable polygon files and invalid polygon geometry.
pub fn polygon_refinements(
    specs: &[PolygonSpec],
    shape: EarthShape,
) -> Result<Vec<PolygonRefinement>, BuildError> {
    specs
        .iter()
        .map(|spec| {
            let polygon = match &spec.source {
                PolygonSource::SphericalCap { lat, lon, radius_deg } => {
                    Polygon::small_circle_degrees(*lat, *lon, *radius_deg, shape)?
                }
                PolygonSource::File(path) => load_polygon_file(path, shape)?,
            };
            Ok(PolygonRefinement {
                polygon,
                tessellation: spec.tessellation,
                target_edge_deg: spec.target_edge_deg,
            })
        })
        .collect()
}
