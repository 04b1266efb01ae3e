//! Seed triangulations for level 0 of every tessellation.
//!
//! Every seed puts vertex 0 on the north pole and lists triangles
//! counter-clockwise when viewed from outside the sphere.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use geotess_geometry::UnitVector;

use crate::GridError;

/// The solid whose projection onto S² forms level 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatonicSolid {
    Tetrahedron,
    Octahedron,
    #[default]
    Icosahedron,
    /// Cube with a pyramid on each face: 14 vertices, 24 triangles.
    Tetrahexahedron,
}

impl PlatonicSolid {
    pub const ALL: [PlatonicSolid; 4] = [
        PlatonicSolid::Tetrahedron,
        PlatonicSolid::Octahedron,
        PlatonicSolid::Icosahedron,
        PlatonicSolid::Tetrahexahedron,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PlatonicSolid::Tetrahedron => "tetrahedron",
            PlatonicSolid::Octahedron => "octahedron",
            PlatonicSolid::Icosahedron => "icosahedron",
            PlatonicSolid::Tetrahexahedron => "tetrahexahedron",
        }
    }

    /// Vertices and triangles of the seed.
    #[must_use]
    pub fn seed(self) -> (Vec<UnitVector>, Vec<[u32; 3]>) {
        match self {
            PlatonicSolid::Tetrahedron => tetrahedron(),
            PlatonicSolid::Octahedron => octahedron(),
            PlatonicSolid::Icosahedron => icosahedron(),
            PlatonicSolid::Tetrahexahedron => tetrahexahedron(),
        }
    }
}

impl fmt::Display for PlatonicSolid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatonicSolid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PlatonicSolid::ALL
            .into_iter()
            .find(|solid| solid.name() == wanted)
            .ok_or_else(|| GridError::UnknownSolid(s.trim().to_string()))
    }
}

fn unit(x: f64, y: f64, z: f64) -> UnitVector {
    UnitVector::new_unchecked(DVec3::new(x, y, z).normalize())
}

fn ring(z: f64, lon_deg: f64) -> UnitVector {
    let r = (1.0 - z * z).sqrt();
    let (s, c) = lon_deg.to_radians().sin_cos();
    unit(r * c, r * s, z)
}

fn tetrahedron() -> (Vec<UnitVector>, Vec<[u32; 3]>) {
    let z = -1.0 / 3.0;
    let vertices = vec![
        UnitVector::NORTH_POLE,
        ring(z, 0.0),
        ring(z, 120.0),
        ring(z, 240.0),
    ];
    (vertices, vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]])
}

fn octahedron() -> (Vec<UnitVector>, Vec<[u32; 3]>) {
    let vertices = vec![
        UnitVector::NORTH_POLE,
        unit(1.0, 0.0, 0.0),
        unit(0.0, 1.0, 0.0),
        unit(-1.0, 0.0, 0.0),
        unit(0.0, -1.0, 0.0),
        UnitVector::SOUTH_POLE,
    ];
    let triangles = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [5, 2, 1],
        [5, 3, 2],
        [5, 4, 3],
        [5, 1, 4],
    ];
    (vertices, triangles)
}

fn icosahedron() -> (Vec<UnitVector>, Vec<[u32; 3]>) {
    let z = 1.0 / 5f64.sqrt();
    let mut vertices = Vec::with_capacity(12);
    vertices.push(UnitVector::NORTH_POLE);
    vertices.extend((0..5).map(|i| ring(z, 18.0 + 72.0 * f64::from(i))));
    vertices.extend((0..5).map(|i| ring(-z, 54.0 + 72.0 * f64::from(i))));
    vertices.push(UnitVector::SOUTH_POLE);

    let mut triangles = Vec::with_capacity(20);
    for i in 0..5u32 {
        let j = (i + 1) % 5;
        triangles.push([0, 1 + i, 1 + j]);
        triangles.push([1 + i, 6 + i, 1 + j]);
        triangles.push([6 + i, 6 + j, 1 + j]);
        triangles.push([11, 6 + j, 6 + i]);
    }
    (vertices, triangles)
}

fn tetrahexahedron() -> (Vec<UnitVector>, Vec<[u32; 3]>) {
    // Face centres 0..6 (+z, +x, +y, -x, -y, -z), then cube corners 6..14
    // ordered by z, y, x sign with + before -.
    let mut vertices = vec![
        UnitVector::NORTH_POLE,
        unit(1.0, 0.0, 0.0),
        unit(0.0, 1.0, 0.0),
        unit(-1.0, 0.0, 0.0),
        unit(0.0, -1.0, 0.0),
        UnitVector::SOUTH_POLE,
    ];
    for sz in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sx in [1.0, -1.0] {
                vertices.push(unit(sx, sy, sz));
            }
        }
    }
    // Corners of each face, counter-clockwise about the outward face normal.
    let faces: [[u32; 4]; 6] = [
        [9, 8, 6, 7],
        [12, 10, 6, 8],
        [10, 11, 7, 6],
        [11, 13, 9, 7],
        [13, 12, 8, 9],
        [11, 10, 12, 13],
    ];
    let triangles = faces
        .iter()
        .enumerate()
        .flat_map(|(centre, corners)| {
            (0..4).map(move |i| [centre as u32, corners[i], corners[(i + 1) % 4]])
        })
        .collect();
    (vertices, triangles)
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;

    fn edge_count(triangles: &[[u32; 3]]) -> usize {
        let mut edges = FxHashSet::default();
        for t in triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.len()
    }

    #[test]
    fn test_seed_sizes_and_euler_characteristic() {
        for (solid, nv, nt) in [
            (PlatonicSolid::Tetrahedron, 4, 4),
            (PlatonicSolid::Octahedron, 6, 8),
            (PlatonicSolid::Icosahedron, 12, 20),
            (PlatonicSolid::Tetrahexahedron, 14, 24),
        ] {
            let (v, t) = solid.seed();
            assert_eq!(v.len(), nv, "{solid}");
            assert_eq!(t.len(), nt, "{solid}");
            assert_eq!(nv as i64 - edge_count(&t) as i64 + nt as i64, 2, "{solid}");
        }
    }

    #[test]
    fn test_seeds_are_outward_oriented() {
        for solid in PlatonicSolid::ALL {
            let (v, t) = solid.seed();
            for tri in &t {
                let [a, b, c] = tri.map(|i| v[i as usize].as_dvec3());
                assert!(a.dot(b.cross(c)) > 0.0, "{solid}: triangle {tri:?}");
            }
        }
    }

    #[test]
    fn test_vertex_zero_is_north_pole() {
        for solid in PlatonicSolid::ALL {
            assert_eq!(solid.seed().0[0], UnitVector::NORTH_POLE);
        }
    }

    #[test]
    fn test_icosahedron_ring_longitudes() {
        let (v, _) = PlatonicSolid::Icosahedron.seed();
        let lon = |i: usize| v[i].lon().to_degrees();
        assert!((lon(1) - 18.0).abs() < 1e-9);
        assert!((lon(2) - 90.0).abs() < 1e-9);
        assert!((lon(6) - 54.0).abs() < 1e-9);
        // Upper and lower rings alternate 36 degrees apart.
        for i in 0..5 {
            let gap = (lon(6 + i) - lon(1 + i)).rem_euclid(360.0);
            assert!((gap - 36.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_and_display() {
        for solid in PlatonicSolid::ALL {
            assert_eq!(solid.to_string().parse::<PlatonicSolid>().unwrap(), solid);
        }
        assert_eq!(
            "ICOSAHEDRON".parse::<PlatonicSolid>().unwrap(),
            PlatonicSolid::Icosahedron
        );
        assert!(matches!(
            "cube".parse::<PlatonicSolid>(),
            Err(GridError::UnknownSolid(_))
        ));
    }
}
