//! Regions on the unit sphere used to restrict refinement and to define
//! active regions.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::spherical::{arc_distance, arcs_intersect, triangle_contains};
use crate::{EarthShape, GeometryError, UnitVector};

/// A closed region of S².
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Polygon {
    /// The whole sphere.
    Global,
    /// A spherical cap: every point within `radius` radians of `center`.
    SmallCircle { center: UnitVector, radius: f64 },
    /// A simple polygon with great-circle edges. `vertices` is open (the
    /// closing edge back to the first vertex is implicit) and `center` is the
    /// normalised vertex centroid.
    Vertices {
        vertices: Vec<UnitVector>,
        center: UnitVector,
    },
}

impl Polygon {
    /// A spherical cap of `radius_deg` degrees about `center`.
    ///
    /// # Errors
    ///
    /// [`GeometryError::InvalidRadius`] unless `0 < radius_deg <= 180`.
    pub fn small_circle(center: UnitVector, radius_deg: f64) -> Result<Self, GeometryError> {
        if !radius_deg.is_finite() || radius_deg <= 0.0 || radius_deg > 180.0 {
            return Err(GeometryError::InvalidRadius(radius_deg));
        }
        Ok(Polygon::SmallCircle {
            center,
            radius: radius_deg.to_radians(),
        })
    }

    /// A spherical cap centred on geodetic `(lat_deg, lon_deg)`.
    ///
    /// # Errors
    ///
    /// See [`Polygon::small_circle`].
    pub fn small_circle_degrees(
        lat_deg: f64,
        lon_deg: f64,
        radius_deg: f64,
        shape: EarthShape,
    ) -> Result<Self, GeometryError> {
        if !(lat_deg.is_finite() && lon_deg.is_finite()) {
            return Err(GeometryError::NonFinite("small circle centre"));
        }
        Self::small_circle(shape.vector_degrees(lat_deg, lon_deg), radius_deg)
    }

    /// A great-circle polygon through `vertices`.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped.
    ///
    /// # Errors
    ///
    /// [`GeometryError::DegeneratePolygon`] with fewer than three distinct
    /// vertices, or when the vertices do not fit strictly inside the
    /// hemisphere centred on their centroid.
    pub fn from_vertices(vertices: Vec<UnitVector>) -> Result<Self, GeometryError> {
        let mut cleaned: Vec<UnitVector> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if cleaned.last().is_none_or(|last| last.angle_to(v) > 1e-12) {
                cleaned.push(v);
            }
        }
        while cleaned.len() > 1 && cleaned[0].angle_to(cleaned[cleaned.len() - 1]) <= 1e-12 {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(format!(
                "{} distinct vertices, need at least 3",
                cleaned.len()
            )));
        }
        let sum: DVec3 = cleaned.iter().map(|v| v.as_dvec3()).sum();
        let center = UnitVector::new(sum).map_err(|_| {
            GeometryError::DegeneratePolygon("vertices have no well-defined centre".into())
        })?;
        if let Some(bad) = cleaned.iter().find(|v| v.dot(center) <= 1e-6) {
            return Err(GeometryError::DegeneratePolygon(format!(
                "vertex {bad} is not within 90 degrees of the polygon centre"
            )));
        }
        Ok(Polygon::Vertices {
            vertices: cleaned,
            center,
        })
    }

    /// A great-circle polygon from geodetic `(lat, lon)` pairs in degrees.
    ///
    /// # Errors
    ///
    /// See [`Polygon::from_vertices`].
    pub fn from_lat_lon_degrees(
        points: &[(f64, f64)],
        shape: EarthShape,
    ) -> Result<Self, GeometryError> {
        if points.iter().any(|(lat, lon)| !(lat.is_finite() && lon.is_finite())) {
            return Err(GeometryError::NonFinite("polygon vertex"));
        }
        Self::from_vertices(
            points
                .iter()
                .map(|&(lat, lon)| shape.vector_degrees(lat, lon))
                .collect(),
        )
    }

    /// A vertex polygon approximating the small circle of `radius_deg` about
    /// `center` with `n` evenly spaced points.
    ///
    /// # Errors
    ///
    /// [`GeometryError::InvalidRadius`] unless `0 < radius_deg < 90`;
    /// [`GeometryError::DegeneratePolygon`] for `n < 3`.
    pub fn small_circle_vertices(
        center: UnitVector,
        radius_deg: f64,
        n: usize,
    ) -> Result<Self, GeometryError> {
        if !radius_deg.is_finite() || radius_deg <= 0.0 || radius_deg >= 90.0 {
            return Err(GeometryError::InvalidRadius(radius_deg));
        }
        if n < 3 {
            return Err(GeometryError::DegeneratePolygon(format!("{n} points")));
        }
        let (east, north) = tangent_basis(center);
        let (sr, cr) = radius_deg.to_radians().sin_cos();
        let c = center.as_dvec3();
        let vertices = (0..n)
            .map(|i| {
                let theta = std::f64::consts::TAU * i as f64 / n as f64;
                let (s, co) = theta.sin_cos();
                UnitVector::new(cr * c + sr * (co * east + s * north))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_vertices(vertices)
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Polygon::Global)
    }

    /// Closed containment test.
    #[must_use]
    pub fn contains(&self, p: UnitVector) -> bool {
        match self {
            Polygon::Global => true,
            Polygon::SmallCircle { center, radius } => center.dot(p) >= radius.cos() - 1e-15,
            Polygon::Vertices { vertices, center } => {
                if p.dot(*center) <= 0.0 {
                    return false;
                }
                if edges(vertices).any(|(a, b)| arc_distance(p, a, b) < 1e-12) {
                    return true;
                }
                let (east, north) = tangent_basis(*center);
                let project = |v: UnitVector| gnomonic(v, *center, east, north);
                let q = project(p);
                let mut inside = false;
                for (a, b) in edges(vertices) {
                    let (pa, pb) = (project(a), project(b));
                    if (pa.y > q.y) != (pb.y > q.y) {
                        let x = pa.x + (q.y - pa.y) / (pb.y - pa.y) * (pb.x - pa.x);
                        if q.x < x {
                            inside = !inside;
                        }
                    }
                }
                inside
            }
        }
    }

    /// `true` when the spherical triangle `(a, b, c)` and the polygon share
    /// at least one point.
    #[must_use]
    pub fn intersects_triangle(&self, a: UnitVector, b: UnitVector, c: UnitVector) -> bool {
        if self.is_global() || self.contains(a) || self.contains(b) || self.contains(c) {
            return true;
        }
        match self {
            Polygon::Global => true,
            Polygon::SmallCircle { center, radius } => {
                triangle_contains(a, b, c, *center)
                    || [(a, b), (b, c), (c, a)]
                        .into_iter()
                        .any(|(p, q)| arc_distance(*center, p, q) <= *radius)
            }
            Polygon::Vertices { vertices, .. } => {
                vertices.iter().any(|v| triangle_contains(a, b, c, *v))
                    || edges(vertices).any(|(p, q)| {
                        arcs_intersect(p, q, a, b)
                            || arcs_intersect(p, q, b, c)
                            || arcs_intersect(p, q, c, a)
                    })
            }
        }
    }
}

fn edges(vertices: &[UnitVector]) -> impl Iterator<Item = (UnitVector, UnitVector)> + '_ {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

/// East / north unit vectors tangent to the sphere at `c`.
fn tangent_basis(c: UnitVector) -> (DVec3, DVec3) {
    let cv = c.as_dvec3();
    let east = DVec3::Z.cross(cv);
    let east = if east.length() < 1e-9 {
        DVec3::Y
    } else {
        east.normalize()
    };
    (east, cv.cross(east))
}

/// Gnomonic projection about `c`: great circles map to straight lines.
fn gnomonic(v: UnitVector, c: UnitVector, east: DVec3, north: DVec3) -> DVec2 {
    let w = v.as_dvec3();
    let d = w.dot(c.as_dvec3());
    DVec2::new(w.dot(east) / d, w.dot(north) / d)
}
