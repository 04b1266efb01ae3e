//! Vectors constrained to the unit sphere.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// A direction on S², stored as a unit-length `DVec3`.
///
/// Construction always normalises, so `x² + y² + z² = 1` holds to within
/// floating-point rounding for every value of this type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitVector(DVec3);

impl UnitVector {
    /// North pole `(0, 0, 1)`.
    pub const NORTH_POLE: UnitVector = UnitVector(DVec3::Z);
    /// South pole `(0, 0, -1)`.
    pub const SOUTH_POLE: UnitVector = UnitVector(DVec3::NEG_Z);

    /// Normalise `v` onto the sphere.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for NaN/infinite components and
    /// [`GeometryError::ZeroVector`] when `v` has (near) zero length.
    pub fn new(v: DVec3) -> Result<Self, GeometryError> {
        if !v.is_finite() {
            return Err(GeometryError::NonFinite("vector"));
        }
        let len = v.length();
        if len < 1e-300 {
            return Err(GeometryError::ZeroVector);
        }
        Ok(Self(v / len))
    }

    /// Wrap a vector the caller already knows is unit length.
    #[must_use]
    pub fn new_unchecked(v: DVec3) -> Self {
        debug_assert!(
            (v.length() - 1.0).abs() < 1e-9,
            "not a unit vector: {v:?} (length {})",
            v.length()
        );
        Self(v)
    }

    /// Build from geocentric latitude and longitude, both in radians.
    #[must_use]
    pub fn from_geocentric(lat: f64, lon: f64) -> Self {
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();
        Self(DVec3::new(clat * clon, clat * slon, slat))
    }

    /// The underlying `DVec3`.
    #[inline]
    #[must_use]
    pub fn as_dvec3(self) -> DVec3 {
        self.0
    }

    /// Component access.
    #[inline]
    #[must_use]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    #[must_use]
    pub fn y(self) -> f64 {
        self.0.y
    }

    #[inline]
    #[must_use]
    pub fn z(self) -> f64 {
        self.0.z
    }

    #[inline]
    #[must_use]
    pub fn dot(self, other: UnitVector) -> f64 {
        self.0.dot(other.0)
    }

    /// Angular distance in radians, in `[0, π]`.
    ///
    /// Uses `atan2(|a × b|, a · b)`, which stays accurate for both nearly
    /// coincident and nearly antipodal vectors.
    #[must_use]
    pub fn angle_to(self, other: UnitVector) -> f64 {
        self.0.cross(other.0).length().atan2(self.0.dot(other.0))
    }

    /// Great-circle midpoint of `self` and `other`: `normalize(a + b)`.
    ///
    /// # Errors
    ///
    /// Fails with [`GeometryError::ZeroVector`] for antipodal inputs.
    pub fn midpoint(self, other: UnitVector) -> Result<UnitVector, GeometryError> {
        UnitVector::new(self.0 + other.0)
    }

    /// Geocentric latitude in radians.
    #[must_use]
    pub fn geocentric_lat(self) -> f64 {
        self.0.z.clamp(-1.0, 1.0).asin()
    }

    /// Longitude in radians, in `(-π, π]`.
    ///
    /// Returns 0 at the poles.
    #[must_use]
    pub fn lon(self) -> f64 {
        if self.0.x == 0.0 && self.0.y == 0.0 {
            0.0
        } else {
            self.0.y.atan2(self.0.x)
        }
    }

    /// The antipodal point.
    #[must_use]
    pub fn antipode(self) -> UnitVector {
        UnitVector(-self.0)
    }
}

impl From<UnitVector> for DVec3 {
    fn from(v: UnitVector) -> Self {
        v.0
    }
}

impl TryFrom<DVec3> for UnitVector {
    type Error = GeometryError;

    fn try_from(v: DVec3) -> Result<Self, Self::Error> {
        UnitVector::new(v)
    }
}

impl fmt::Display for UnitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.9}, {:.9}, {:.9})", self.0.x, self.0.y, self.0.z)
    }
}
