//! The `polygons` property grammar.
//!
//! ```text
//! polygons = spherical_cap, <lat>, <lon>, <radiusDeg>, <tessId>, <targetEdgeDeg>; ...
//! polygons = <path>, <tessId>, <targetEdgeDeg>
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Where a refinement polygon comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolygonSource {
    /// Small circle centred at geodetic `(lat, lon)` degrees.
    SphericalCap { lat: f64, lon: f64, radius_deg: f64 },
    /// KML or plain-text polygon file.
    File(PathBuf),
}

/// A polygon with the tessellation it refines and the edge length to reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSpec {
    pub source: PolygonSource,
    pub tessellation: usize,
    pub target_edge_deg: f64,
}

impl FromStr for PolygonSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let invalid = |reason: &str| ConfigError::InvalidPolygon {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        let fields: Vec<&str> = spec.split(',').map(str::trim).collect();
        let number = |i: usize, what: &str| -> Result<f64, ConfigError> {
            fields[i]
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| invalid(&format!("{what} '{}' is not a number", fields[i])))
        };

        let (source, tail) = if fields[0].eq_ignore_ascii_case("spherical_cap") {
            if fields.len() != 6 {
                return Err(invalid(
                    "expected spherical_cap, lat, lon, radiusDeg, tessId, targetEdgeDeg",
                ));
            }
            let lat = number(1, "latitude")?;
            let lon = number(2, "longitude")?;
            let radius_deg = number(3, "radius")?;
            if !(-90.0..=90.0).contains(&lat) {
                return Err(invalid("latitude outside [-90, 90]"));
            }
            if radius_deg <= 0.0 || radius_deg > 180.0 {
                return Err(invalid("radius outside (0, 180]"));
            }
            (PolygonSource::SphericalCap { lat, lon, radius_deg }, 4)
        } else {
            if fields.len() != 3 || fields[0].is_empty() {
                return Err(invalid("expected <path>, tessId, targetEdgeDeg"));
            }
            (PolygonSource::File(PathBuf::from(fields[0])), 1)
        };

        let tessellation = fields[tail]
            .parse::<usize>()
            .map_err(|_| invalid(&format!("tessellation id '{}' is not an index", fields[tail])))?;
        let target_edge_deg = number(tail + 1, "target edge length")?;
        if target_edge_deg <= 0.0 {
            return Err(invalid("target edge length must be positive"));
        }
        Ok(Self {
            source,
            tessellation,
            target_edge_deg,
        })
    }
}

impl fmt::Display for PolygonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            PolygonSource::SphericalCap { lat, lon, radius_deg } => {
                write!(f, "spherical_cap, {lat}, {lon}, {radius_deg}")?;
            }
            PolygonSource::File(path) => write!(f, "{}", path.display())?,
        }
        write!(f, ", {}, {}", self.tessellation, self.target_edge_deg)
    }
}

/// Parse a `;`-separated list of polygon specs. Empty entries are skipped.
///
/// # Errors
///
/// The first spec that fails to parse.
pub fn parse_polygon_list(value: &str) -> Result<Vec<PolygonSpec>, ConfigError> {
    value
        .split(';')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cap_list() {
        let specs = parse_polygon_list(
            "spherical_cap, 10.000000, 20.000000, 18.00, 0, 2.0000; \
             spherical_cap, 10.000000, 20.000000, 2.00, 0, 1.0000; ",
        )
        .unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[1],
            PolygonSpec {
                source: PolygonSource::SphericalCap {
                    lat: 10.0,
                    lon: 20.0,
                    radius_deg: 2.0
                },
                tessellation: 0,
                target_edge_deg: 1.0,
            }
        );
    }

    #[test]
    fn test_parse_file_spec() {
        let spec: PolygonSpec = "testdata/test_polygons.kml, 0, 1".parse().unwrap();
        assert_eq!(spec.source, PolygonSource::File("testdata/test_polygons.kml".into()));
        assert_eq!(spec.target_edge_deg, 1.0);
    }

    #[test]
    fn test_display_reparses() {
        let spec: PolygonSpec = "SPHERICAL_CAP, -5.5, 120, 30, 1, 4".parse().unwrap();
        let again: PolygonSpec = spec.to_string().parse().unwrap();
        assert_eq!(again, spec);
    }

    #[test]
    fn test_rejects_bad_specs() {
        for s in [
            "spherical_cap, 10, 20, 18, 0",
            "spherical_cap, 100, 20, 18, 0, 2",
            "spherical_cap, 10, 20, 0, 0, 2",
            "spherical_cap, 10, 20, 18, -1, 2",
            "spherical_cap, 10, 20, 18, 0, 0",
            "spherical_cap, ten, 20, 18, 0, 2",
            "poly.kml, 0",
            ", 0, 1",
        ] {
            assert!(
                matches!(s.parse::<PolygonSpec>(), Err(ConfigError::InvalidPolygon { .. })),
                "{s}"
            );
        }
    }
}
