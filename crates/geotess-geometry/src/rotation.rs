//! Euler-angle rotation of the unit sphere.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::{EarthShape, GeometryError, UnitVector};

/// A z-x-z Euler rotation, angles in degrees.
///
/// The rotation matrix is `Rz(alpha) · Rx(beta) · Rz(gamma)` with active
/// (right-handed, counter-clockwise) elementary rotations, so a vector is
/// first spun by `gamma` about z, tilted by `beta` about x, then spun by
/// `alpha` about z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EulerRotation {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl EulerRotation {
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] when any angle is NaN or infinite.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self, GeometryError> {
        if !(alpha.is_finite() && beta.is_finite() && gamma.is_finite()) {
            return Err(GeometryError::NonFinite("euler rotation angle"));
        }
        Ok(Self { alpha, beta, gamma })
    }

    /// The rotation that carries the north pole (grid vertex 0) to the
    /// geodetic position `(lat_deg, lon_deg)`.
    ///
    /// `alpha = lon + 90`, `beta = 90 - geocentric(lat)`, `gamma = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for non-finite coordinates.
    pub fn placing_pole_at(
        lat_deg: f64,
        lon_deg: f64,
        shape: EarthShape,
    ) -> Result<Self, GeometryError> {
        if !(lat_deg.is_finite() && lon_deg.is_finite()) {
            return Err(GeometryError::NonFinite("rotation target"));
        }
        Self::new(lon_deg + 90.0, 90.0 - shape.geocentric_lat_degrees(lat_deg), 0.0)
    }

    #[must_use]
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_rotation_z(self.alpha.to_radians())
            * DMat3::from_rotation_x(self.beta.to_radians())
            * DMat3::from_rotation_z(self.gamma.to_radians())
    }

    /// Rotate a single vector.
    #[must_use]
    pub fn apply(&self, v: UnitVector) -> UnitVector {
        rotate_with(&self.matrix(), v)
    }

    /// Rotate every vector in place, building the matrix once.
    pub fn apply_all(&self, vs: &mut [UnitVector]) {
        let m = self.matrix();
        for v in vs.iter_mut() {
            *v = rotate_with(&m, *v);
        }
    }
}

fn rotate_with(m: &DMat3, v: UnitVector) -> UnitVector {
    let r: DVec3 = *m * v.as_dvec3();
    // Renormalise: rounding in the matrix product leaves |r| = 1 ± ulp.
    UnitVector::new(r).unwrap_or(v)
}
