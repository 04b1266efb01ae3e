//! Reference ellipsoids and geodetic ↔ geocentric latitude conversion.
//!
//! Grid vertices are stored as geocentric unit vectors. Latitudes that users
//! type in (polygon centres, rotation targets) are geodetic, so every
//! conversion between the two goes through an [`EarthShape`].

use serde::{Deserialize, Serialize};

use crate::UnitVector;

/// The shape used to convert between geodetic and geocentric latitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EarthShape {
    /// A perfect sphere; geodetic and geocentric latitudes coincide.
    Sphere,
    /// The WGS84 ellipsoid.
    #[default]
    Wgs84,
    /// The GRS80 ellipsoid.
    Grs80,
}

impl EarthShape {
    /// Equatorial radius in km.
    #[must_use]
    pub fn equatorial_radius_km(self) -> f64 {
        match self {
            EarthShape::Sphere => 6371.0,
            EarthShape::Wgs84 | EarthShape::Grs80 => 6378.137,
        }
    }

    /// Flattening `f = (a - b) / a`.
    #[must_use]
    pub fn flattening(self) -> f64 {
        match self {
            EarthShape::Sphere => 0.0,
            EarthShape::Wgs84 => 1.0 / 298.257_223_563,
            EarthShape::Grs80 => 1.0 / 298.257_222_101,
        }
    }

    /// First eccentricity squared, `e² = f (2 - f)`.
    #[must_use]
    pub fn eccentricity_sqr(self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// Geodetic latitude (radians) to geocentric latitude (radians).
    #[must_use]
    pub fn geocentric_lat(self, geodetic: f64) -> f64 {
        let (s, c) = geodetic.sin_cos();
        ((1.0 - self.eccentricity_sqr()) * s).atan2(c)
    }

    /// Geocentric latitude (radians) to geodetic latitude (radians).
    #[must_use]
    pub fn geodetic_lat(self, geocentric: f64) -> f64 {
        let (s, c) = geocentric.sin_cos();
        s.atan2((1.0 - self.eccentricity_sqr()) * c)
    }

    /// Geocentric latitude in degrees for a geodetic latitude in degrees.
    #[must_use]
    pub fn geocentric_lat_degrees(self, geodetic_deg: f64) -> f64 {
        self.geocentric_lat(geodetic_deg.to_radians()).to_degrees()
    }

    /// Unit vector for a geodetic (lat, lon) in degrees.
    #[must_use]
    pub fn vector_degrees(self, lat_deg: f64, lon_deg: f64) -> UnitVector {
        UnitVector::from_geocentric(
            self.geocentric_lat(lat_deg.to_radians()),
            lon_deg.to_radians(),
        )
    }

    /// Geodetic latitude of `v` in degrees.
    #[must_use]
    pub fn lat_degrees(self, v: UnitVector) -> f64 {
        self.geodetic_lat(v.geocentric_lat()).to_degrees()
    }

    /// Longitude of `v` in degrees, in `(-180, 180]`.
    #[must_use]
    pub fn lon_degrees(self, v: UnitVector) -> f64 {
        v.lon().to_degrees()
    }

    /// Distance in km from the earth centre to the ellipsoid surface in
    /// direction `v`.
    #[must_use]
    pub fn radius_km(self, v: UnitVector) -> f64 {
        let a = self.equatorial_radius_km();
        let e2 = self.eccentricity_sqr();
        let s2 = v.z() * v.z();
        a * ((1.0 - e2) / (1.0 - e2 * (1.0 - s2))).sqrt()
    }

    /// Lower-case name as used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EarthShape::Sphere => "sphere",
            EarthShape::Wgs84 => "wgs84",
            EarthShape::Grs80 => "grs80",
        }
    }
}

impl std::str::FromStr for EarthShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" => Ok(EarthShape::Sphere),
            "wgs84" => Ok(EarthShape::Wgs84),
            "grs80" => Ok(EarthShape::Grs80),
            other => Err(format!("unknown earth shape '{other}'")),
        }
    }
}
