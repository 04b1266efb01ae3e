//! Unit-sphere geometry: unit vectors, geodetic conversion, Euler rotation,
//! and spherical polygon containment.

mod earth_shape;
mod error;
mod polygon;
mod rotation;
mod spherical;
mod unit_vector;

pub use earth_shape::EarthShape;
pub use error::GeometryError;
pub use polygon::Polygon;
pub use rotation::EulerRotation;
pub use spherical::{arc_distance, arcs_intersect, triangle_contains};
pub use unit_vector::UnitVector;
